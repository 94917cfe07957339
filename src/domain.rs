use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnteroError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Senterica,
    #[default]
    Ecoli,
    Clostridium,
    Vibrio,
    Yersinia,
    Helicobacter,
    Mcatarrhalis,
}

impl Database {
    pub const ALL: [Database; 7] = [
        Database::Senterica,
        Database::Ecoli,
        Database::Clostridium,
        Database::Vibrio,
        Database::Yersinia,
        Database::Helicobacter,
        Database::Mcatarrhalis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Database::Senterica => "senterica",
            Database::Ecoli => "ecoli",
            Database::Clostridium => "clostridium",
            Database::Vibrio => "vibrio",
            Database::Yersinia => "yersinia",
            Database::Helicobacter => "helicobacter",
            Database::Mcatarrhalis => "mcatarrhalis",
        }
    }

    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|db| db.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Database {
    type Err = EnteroError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|db| db.as_str() == value.trim())
            .ok_or_else(|| EnteroError::InvalidDatabase(value.to_string()))
    }
}

/// Enterobase login pair. Kept in memory for one run; `Debug` hides the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque API token issued by the login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarcodeEntry {
    pub name: String,
    pub barcode: String,
}

impl BarcodeEntry {
    pub fn new(name: impl Into<String>, barcode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            barcode: barcode.into(),
        }
    }

    /// True when neither field can steer the file name out of its directory.
    pub fn is_path_safe(&self) -> bool {
        let plain = |value: &str| !value.contains(['/', '\\']);
        plain(&self.name) && plain(&self.barcode) && self.name != "." && self.name != ".."
    }

    pub fn file_name(&self, append_barcode: bool) -> String {
        if append_barcode {
            format!("{}__{}.fna", self.name, self.barcode)
        } else {
            format!("{}.fna", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_database_valid() {
        let db: Database = "senterica".parse().unwrap();
        assert_eq!(db, Database::Senterica);
        assert_eq!(Database::default().as_str(), "ecoli");
    }

    #[test]
    fn parse_database_invalid() {
        let err = "listeria".parse::<Database>().unwrap_err();
        assert_matches!(err, EnteroError::InvalidDatabase(_));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = Credentials::new("alice", "hunter2");
        let token = Token::new("abc.def");
        assert!(!format!("{credentials:?}").contains("hunter2"));
        assert!(!format!("{token:?}").contains("abc.def"));
    }

    #[test]
    fn file_name_policy() {
        let entry = BarcodeEntry::new("strainA", "ESC_AA1234AA_AS");
        assert_eq!(entry.file_name(false), "strainA.fna");
        assert_eq!(entry.file_name(true), "strainA__ESC_AA1234AA_AS.fna");
    }

    #[test]
    fn path_like_names_are_unsafe() {
        assert!(BarcodeEntry::new("strain.A-1", "BC1").is_path_safe());
        assert!(!BarcodeEntry::new("../escaped", "BC1").is_path_safe());
        assert!(!BarcodeEntry::new("/tmp/abs", "BC1").is_path_safe());
        assert!(!BarcodeEntry::new("sub\\dir", "BC1").is_path_safe());
        assert!(!BarcodeEntry::new("..", "BC1").is_path_safe());
        assert!(!BarcodeEntry::new("strainA", "BC/1").is_path_safe());
    }
}
