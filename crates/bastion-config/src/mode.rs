use std::{fmt, str::FromStr};

use clap::ValueEnum;

/// Deployment mode; picks the `.env.<mode>` file and the console log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ServerMode {
    #[default]
    Dev,
    Prod,
    Test,
}

impl ServerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
            Self::Test => "test",
        }
    }

    pub fn env_file(self) -> String {
        format!(".env.{}", self.as_str())
    }
}

impl fmt::Display for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown server mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("prod".parse::<ServerMode>().unwrap(), ServerMode::Prod);
        assert_eq!("Development".parse::<ServerMode>().unwrap(), ServerMode::Dev);
        assert!("staging".parse::<ServerMode>().is_err());
    }

    #[test]
    fn test_env_file_name() {
        assert_eq!(ServerMode::Test.env_file(), ".env.test");
    }
}
