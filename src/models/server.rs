//! Server codes and their routing profile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Routing values for one server: the regional cluster used by account and
/// match endpoints, and the platform host used by summoner and league
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerProfile {
    pub region: &'static str,
    pub platform: &'static str,
}

/// Supported server codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServerCode {
    Na,
    Br,
    Lan,
    Las,
    Euw,
    Eune,
    Tr,
    Kr,
    Jp,
}

impl ServerCode {
    pub const ALL: [ServerCode; 9] = [
        ServerCode::Na,
        ServerCode::Br,
        ServerCode::Lan,
        ServerCode::Las,
        ServerCode::Euw,
        ServerCode::Eune,
        ServerCode::Tr,
        ServerCode::Kr,
        ServerCode::Jp,
    ];

    pub fn profile(&self) -> ServerProfile {
        let (region, platform) = match self {
            ServerCode::Na => ("americas", "na1"),
            ServerCode::Br => ("americas", "br1"),
            ServerCode::Lan => ("americas", "la1"),
            ServerCode::Las => ("americas", "la2"),
            ServerCode::Euw => ("europe", "euw1"),
            ServerCode::Eune => ("europe", "eun1"),
            ServerCode::Tr => ("europe", "tr1"),
            ServerCode::Kr => ("asia", "kr"),
            ServerCode::Jp => ("asia", "jp1"),
        };
        ServerProfile { region, platform }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerCode::Na => "NA",
            ServerCode::Br => "BR",
            ServerCode::Lan => "LAN",
            ServerCode::Las => "LAS",
            ServerCode::Euw => "EUW",
            ServerCode::Eune => "EUNE",
            ServerCode::Tr => "TR",
            ServerCode::Kr => "KR",
            ServerCode::Jp => "JP",
        }
    }
}

impl fmt::Display for ServerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerCode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ServerCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TrackerError::InvalidServer(s.to_string()))
    }
}
