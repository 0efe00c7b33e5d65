//! Team Entity

use serde::{Deserialize, Deserializer, Serialize};

use super::entity::{optional, required, Collection, DomainResult, Entity};
use super::wire;

/// Number of member avatars shown on a team card before "+N"
pub const AVATAR_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(default, deserialize_with = "members")]
    pub members: Vec<Member>,
}

/// A team member; the server sends either `{name, initials}` or a bare name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MemberRepr")]
pub struct Member {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MemberRepr {
    Name(String),
    Full {
        #[serde(default, deserialize_with = "wire::optional_text")]
        name: Option<String>,
        #[serde(default, deserialize_with = "wire::optional_text")]
        initials: Option<String>,
    },
    /// null, numbers and other stray entries
    Other(serde_json::Value),
}

impl From<MemberRepr> for Member {
    fn from(repr: MemberRepr) -> Self {
        match repr {
            MemberRepr::Name(name) => Member { name, initials: None },
            MemberRepr::Full { name, initials } => Member {
                name: name.unwrap_or_default(),
                initials: optional(initials.as_deref()),
            },
            MemberRepr::Other(_) => Member::named(""),
        }
    }
}

fn members<'de, D>(deserializer: D) -> Result<Vec<Member>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Member>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Member {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initials: None,
        }
    }

    /// Initials if given, else the first letter of the name, else "?"
    pub fn avatar(&self) -> String {
        if let Some(initials) = &self.initials {
            return initials.clone();
        }
        match self.name.trim().chars().next() {
            Some(first) => first.to_uppercase().collect(),
            None => "?".to_string(),
        }
    }
}

/// Avatar labels for a team card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamAvatars {
    pub labels: Vec<String>,
    /// Members not shown individually
    pub overflow: usize,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Team name, or a placeholder for unnamed teams
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unnamed Team"
        } else {
            &self.name
        }
    }

    pub fn avatars(&self) -> TeamAvatars {
        TeamAvatars {
            labels: self.members.iter().take(AVATAR_LIMIT).map(Member::avatar).collect(),
            overflow: self.members.len().saturating_sub(AVATAR_LIMIT),
        }
    }
}

impl Entity for Team {
    const COLLECTION: Collection = Collection::Teams;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A member to append to a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMember {
    pub name: String,
}

impl NewMember {
    pub fn new(name: &str) -> DomainResult<Self> {
        Ok(Self {
            name: required("member name", name)?,
        })
    }

    pub fn into_member(self) -> Member {
        Member::named(self.name)
    }
}

/// Input for creating a team
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeam {
    pub name: String,
    pub members: Vec<NewMember>,
}

impl NewTeam {
    /// Build from raw form input; blank member entries are dropped
    pub fn new<I, S>(name: impl Into<String>, member_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            members: member_names
                .into_iter()
                .filter_map(|n| NewMember::new(n.as_ref()).ok())
                .collect(),
        }
    }

    pub fn validate(&self) -> DomainResult<NewTeam> {
        Ok(NewTeam {
            name: required("team name", &self.name)?,
            members: self.members.clone(),
        })
    }
}
