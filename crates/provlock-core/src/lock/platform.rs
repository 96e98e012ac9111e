//! Platform token parsing (`os_arch`).

use super::error::LockError;
use std::fmt;
use std::str::FromStr;

/// Operating systems providers are published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    FreeBsd,
    Linux,
    NetBsd,
    OpenBsd,
    Solaris,
    Windows,
}

impl Os {
    pub const ALL: [Os; 7] = [
        Os::Darwin,
        Os::FreeBsd,
        Os::Linux,
        Os::NetBsd,
        Os::OpenBsd,
        Os::Solaris,
        Os::Windows,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::FreeBsd => "freebsd",
            Self::Linux => "linux",
            Self::NetBsd => "netbsd",
            Self::OpenBsd => "openbsd",
            Self::Solaris => "solaris",
            Self::Windows => "windows",
        }
    }
}

impl FromStr for Os {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|os| os.as_str() == s).ok_or(())
    }
}

/// CPU architectures providers are published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    Amd64,
    Arm,
    Arm64,
}

impl Arch {
    pub const ALL: [Arch; 4] = [Arch::X86, Arch::Amd64, Arch::Arm, Arch::Arm64];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "386",
            Self::Amd64 => "amd64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
        }
    }
}

impl FromStr for Arch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|a| a.as_str() == s).ok_or(())
    }
}

/// An operating-system/architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    /// Parse an `os_arch` token such as `darwin_arm64`.
    ///
    /// # Errors
    /// Returns `InvalidPlatform` unless the token is exactly two non-empty
    /// `_`-separated parts drawn from the known OS and architecture sets.
    pub fn parse(token: &str) -> Result<Self, LockError> {
        let parts: Vec<&str> = token.split('_').collect();
        let [os, arch] = parts.as_slice() else {
            return Err(LockError::invalid_platform(
                token,
                "expected the form 'os_arch'",
            ));
        };

        if os.is_empty() || arch.is_empty() {
            return Err(LockError::invalid_platform(
                token,
                "expected the form 'os_arch'",
            ));
        }

        let os = os
            .parse::<Os>()
            .map_err(|()| LockError::invalid_platform(token, format!("unknown os '{os}'")))?;
        let arch = arch.parse::<Arch>().map_err(|()| {
            LockError::invalid_platform(token, format!("unknown architecture '{arch}'"))
        })?;

        Ok(Self { os, arch })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os.as_str(), self.arch.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        let p = Platform::parse("darwin_arm64").unwrap();
        assert_eq!(p.os, Os::Darwin);
        assert_eq!(p.arch, Arch::Arm64);

        let p = Platform::parse("linux_386").unwrap();
        assert_eq!(p.arch, Arch::X86);
    }

    #[test]
    fn test_display_round_trips_token() {
        for token in ["darwin_amd64", "windows_386", "freebsd_arm", "openbsd_amd64"] {
            assert_eq!(Platform::parse(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn test_parse_rejects() {
        for input in [
            "foo",
            "",
            "_",
            "linux_",
            "_amd64",
            "linux_amd64_v2",
            "plan9_amd64",
            "linux_x86_64",
            "Linux_amd64",
        ] {
            let err = Platform::parse(input).unwrap_err();
            assert!(
                matches!(err, LockError::InvalidPlatform { .. }),
                "expected InvalidPlatform for {input:?}, got {err:?}"
            );
        }
    }
}
