// Country display names
// Loaded from a JSON object of the form {"US": "United States", ...}

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct CountryNames {
    names: HashMap<String, String>,
}

impl CountryNames {
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> io::Result<Self> {
        let names = serde_json::from_str(content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { names })
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let names = CountryNames::from_json(r#"{"US":"United States","DE":"Germany"}"#).unwrap();
        assert_eq!(names.get("DE"), Some("Germany"));
        assert_eq!(names.get("FR"), None);
    }

    #[test]
    fn test_invalid_json() {
        let err = CountryNames::from_json("[1,2]").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_missing_file() {
        assert!(CountryNames::load("/definitely/not/here.json").is_err());
    }
}
