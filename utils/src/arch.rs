use std::str::FromStr;

use miette::bail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// Every architecture the target supports, built as a single artifact.
    Multiple,
    Amd64,
    I386,
    Arm,
    Arm64,
}

impl Architecture {
    /// Wildcard accepted in an architecture list to select every
    /// supported architecture.
    pub const WILDCARD: &'static str = "*";

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Multiple => "multiple",
            Self::Amd64 => "amd64",
            Self::I386 => "386",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
        }
    }

    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(*self, Self::Multiple)
    }

    /// Parses a comma separated list of architectures and checks
    /// each of them against the architectures a target supports.
    ///
    /// The wildcard `*` expands to every supported architecture except
    /// [`Architecture::Multiple`]. Duplicates are dropped, keeping
    /// the first occurrence.
    ///
    /// # Errors
    /// Will error if an entry isn't a known architecture or isn't
    /// supported by the target.
    pub fn parse_list(value: &str, supported: &[Self]) -> miette::Result<Vec<Self>> {
        let value = value.trim();

        if value == Self::WILDCARD {
            return Ok(supported
                .iter()
                .copied()
                .filter(|arch| !arch.is_multiple())
                .collect());
        }

        let mut archs = Vec::new();
        for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let arch: Self = entry.parse()?;

            if !supported.contains(&arch) {
                bail!(
                    "Arch {arch} is not supported. Supported: {}",
                    supported
                        .iter()
                        .map(Self::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }

            if !archs.contains(&arch) {
                archs.push(arch);
            }
        }

        if archs.is_empty() {
            bail!("At least one target architecture is required");
        }

        Ok(archs)
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = miette::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "multiple" | "all" => Self::Multiple,
            "amd64" => Self::Amd64,
            "386" => Self::I386,
            "arm" => Self::Arm,
            "arm64" => Self::Arm64,
            arch => bail!("Arch {arch} unsupported"),
        })
    }
}
