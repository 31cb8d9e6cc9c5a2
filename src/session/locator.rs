//! Service locator strings.
//!
//! A locator names a transport and its options:
//!
//! ```text
//! tcp: host=10.0.0.1, port=12246
//! unix: path=/tmp/coordinator.sock
//! ```
//!
//! Several alternatives may be joined with `;`; callers pick the first one
//! they support.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One parsed `protocol: key=value, ...` alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLocator {
    original: String,
    protocol: String,
    options: BTreeMap<String, String>,
}

impl ServiceLocator {
    /// Parse every `;`-separated alternative in `s`.
    pub fn parse_all(s: &str) -> Result<Vec<ServiceLocator>> {
        let locators = s
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Self::parse_one)
            .collect::<Result<Vec<_>>>()?;
        if locators.is_empty() {
            return Err(Error::Config(format!("empty service locator: {:?}", s)));
        }
        Ok(locators)
    }

    fn parse_one(s: &str) -> Result<ServiceLocator> {
        let (protocol, rest) = s
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("missing protocol in locator {:?}", s)))?;
        let protocol = protocol.trim();
        if protocol.is_empty() || !protocol.chars().all(|c| c.is_ascii_alphanumeric() || c == '+') {
            return Err(Error::Config(format!("bad protocol in locator {:?}", s)));
        }

        let mut options = BTreeMap::new();
        for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("option {:?} has no value in {:?}", pair, s)))?;
            options.insert(key.trim().to_string(), value.trim().to_string());
        }

        Ok(ServiceLocator {
            original: s.to_string(),
            protocol: protocol.to_string(),
            options,
        })
    }

    /// Transport name, e.g. `tcp`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// An option that must be present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.option(key).ok_or_else(|| {
            Error::Config(format!("locator {:?} lacks option {:?}", self.original, key))
        })
    }

    /// The locator text this was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }
}

impl FromStr for ServiceLocator {
    type Err = Error;

    /// Parse a single alternative; `;` is not allowed.
    fn from_str(s: &str) -> Result<Self> {
        let mut all = Self::parse_all(s)?;
        if all.len() != 1 {
            return Err(Error::Config(format!(
                "expected one locator, found {} in {:?}",
                all.len(),
                s
            )));
        }
        Ok(all.remove(0))
    }
}

impl fmt::Display for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp() {
        let locator: ServiceLocator = "tcp: host=10.0.0.1, port=12246".parse().unwrap();
        assert_eq!(locator.protocol(), "tcp");
        assert_eq!(locator.option("host"), Some("10.0.0.1"));
        assert_eq!(locator.require("port").unwrap(), "12246");
        assert_eq!(locator.to_string(), "tcp: host=10.0.0.1, port=12246");
    }

    #[test]
    fn test_parse_alternatives() {
        let all = ServiceLocator::parse_all("infrc: host=a, port=1; tcp: host=a, port=2").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].protocol(), "infrc");
        assert_eq!(all[1].option("port"), Some("2"));
        assert!("infrc: host=a; tcp: host=b".parse::<ServiceLocator>().is_err());
    }

    #[test]
    fn test_no_options() {
        let locator: ServiceLocator = "mock:".parse().unwrap();
        assert_eq!(locator.protocol(), "mock");
        assert!(locator.require("host").is_err());
    }

    #[test]
    fn test_malformed() {
        assert!("".parse::<ServiceLocator>().is_err());
        assert!("host=a".parse::<ServiceLocator>().is_err());
        assert!("tcp: host".parse::<ServiceLocator>().is_err());
        assert!(" : host=a".parse::<ServiceLocator>().is_err());
    }
}
