//! Operating system and CPU architecture targets.
//!
//! Names follow the Go toolchain spelling (`darwin`, `amd64`, `386`, ...) since
//! those are what configuration documents and wrapper file names use. Rust
//! spellings (`macos`, `x86_64`, `aarch64`, ...) are accepted on input.

use crate::bundler::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Operating system of a build target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Os {
    /// IBM AIX
    Aix,
    /// Android
    Android,
    /// macOS
    Darwin,
    /// DragonFly BSD
    Dragonfly,
    /// FreeBSD
    Freebsd,
    /// illumos
    Illumos,
    /// iOS
    Ios,
    /// JavaScript host
    Js,
    /// Linux
    Linux,
    /// NetBSD
    Netbsd,
    /// OpenBSD
    Openbsd,
    /// Plan 9
    Plan9,
    /// Solaris
    Solaris,
    /// WASI preview 1
    Wasip1,
    /// Windows
    Windows,
}

impl Os {
    /// Canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aix => "aix",
            Self::Android => "android",
            Self::Darwin => "darwin",
            Self::Dragonfly => "dragonfly",
            Self::Freebsd => "freebsd",
            Self::Illumos => "illumos",
            Self::Ios => "ios",
            Self::Js => "js",
            Self::Linux => "linux",
            Self::Netbsd => "netbsd",
            Self::Openbsd => "openbsd",
            Self::Plan9 => "plan9",
            Self::Solaris => "solaris",
            Self::Wasip1 => "wasip1",
            Self::Windows => "windows",
        }
    }

    /// Operating system this binary was compiled for.
    pub fn host() -> Self {
        Self::from_str(std::env::consts::OS).unwrap_or(Self::Linux)
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let os = match s.trim().to_ascii_lowercase().as_str() {
            "aix" => Self::Aix,
            "android" => Self::Android,
            "darwin" | "macos" | "osx" => Self::Darwin,
            "dragonfly" => Self::Dragonfly,
            "freebsd" => Self::Freebsd,
            "illumos" => Self::Illumos,
            "ios" => Self::Ios,
            "js" => Self::Js,
            "linux" => Self::Linux,
            "netbsd" => Self::Netbsd,
            "openbsd" => Self::Openbsd,
            "plan9" => Self::Plan9,
            "solaris" => Self::Solaris,
            "wasip1" => Self::Wasip1,
            "windows" => Self::Windows,
            other => return Err(Error::GenericError(format!("unknown OS: {other}"))),
        };
        Ok(os)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture of a build target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Arch {
    /// x86 / i686 (32-bit)
    I386,
    /// x86_64 / AMD64 (64-bit)
    Amd64,
    /// 32-bit ARM
    Arm,
    /// AArch64 / ARM64
    Arm64,
    /// LoongArch 64
    Loong64,
    /// MIPS big endian
    Mips,
    /// MIPS64 big endian
    Mips64,
    /// MIPS64 little endian
    Mips64le,
    /// MIPS little endian
    Mipsle,
    /// POWER big endian
    Ppc64,
    /// POWER little endian
    Ppc64le,
    /// RISC-V 64
    Riscv64,
    /// IBM Z
    S390x,
    /// SPARC 64
    Sparc64,
    /// WebAssembly
    Wasm,
}

impl Arch {
    /// Canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::I386 => "386",
            Self::Amd64 => "amd64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Loong64 => "loong64",
            Self::Mips => "mips",
            Self::Mips64 => "mips64",
            Self::Mips64le => "mips64le",
            Self::Mipsle => "mipsle",
            Self::Ppc64 => "ppc64",
            Self::Ppc64le => "ppc64le",
            Self::Riscv64 => "riscv64",
            Self::S390x => "s390x",
            Self::Sparc64 => "sparc64",
            Self::Wasm => "wasm",
        }
    }

    /// Architecture this binary was compiled for.
    pub fn host() -> Self {
        Self::from_str(std::env::consts::ARCH).unwrap_or(Self::Amd64)
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let arch = match s.trim().to_ascii_lowercase().as_str() {
            "386" | "x86" | "i386" | "i686" => Self::I386,
            "amd64" | "x86_64" | "x64" => Self::Amd64,
            "arm" | "armhf" | "armel" => Self::Arm,
            "arm64" | "aarch64" => Self::Arm64,
            "loong64" | "loongarch64" => Self::Loong64,
            "mips" => Self::Mips,
            "mips64" => Self::Mips64,
            "mips64le" => Self::Mips64le,
            "mipsle" => Self::Mipsle,
            "ppc64" | "powerpc64" => Self::Ppc64,
            "ppc64le" => Self::Ppc64le,
            "riscv64" => Self::Riscv64,
            "s390x" => Self::S390x,
            "sparc64" => Self::Sparc64,
            "wasm" | "wasm32" => Self::Wasm,
            other => return Err(Error::GenericError(format!("unknown architecture: {other}"))),
        };
        Ok(arch)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How well a target combination is supported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Support {
    /// Built and tested for every release
    FirstClass,
    /// Known to build, not gated on
    Ported,
    /// Known to be broken
    Broken,
}

use Arch::*;
use Os::*;
use Support::*;

/// Every known OS/architecture combination and its classification.
pub static SUPPORT_TABLE: &[(Os, Arch, Support)] = &[
    (Aix, Ppc64, Ported),
    (Android, I386, Ported),
    (Android, Amd64, Ported),
    (Android, Arm, Ported),
    (Android, Arm64, Ported),
    (Darwin, Amd64, FirstClass),
    (Darwin, Arm64, FirstClass),
    (Dragonfly, Amd64, Ported),
    (Freebsd, I386, Ported),
    (Freebsd, Amd64, Ported),
    (Freebsd, Arm, Ported),
    (Freebsd, Arm64, Ported),
    (Freebsd, Riscv64, Ported),
    (Illumos, Amd64, Ported),
    (Ios, Amd64, Ported),
    (Ios, Arm64, Ported),
    (Js, Wasm, Ported),
    (Linux, I386, FirstClass),
    (Linux, Amd64, FirstClass),
    (Linux, Arm, FirstClass),
    (Linux, Arm64, FirstClass),
    (Linux, Loong64, Ported),
    (Linux, Mips, Ported),
    (Linux, Mips64, Ported),
    (Linux, Mips64le, Ported),
    (Linux, Mipsle, Ported),
    (Linux, Ppc64, Ported),
    (Linux, Ppc64le, Ported),
    (Linux, Riscv64, Ported),
    (Linux, S390x, Ported),
    (Linux, Sparc64, Broken),
    (Netbsd, I386, Ported),
    (Netbsd, Amd64, Ported),
    (Netbsd, Arm, Ported),
    (Netbsd, Arm64, Ported),
    (Openbsd, I386, Ported),
    (Openbsd, Amd64, Ported),
    (Openbsd, Arm, Ported),
    (Openbsd, Arm64, Ported),
    (Openbsd, Mips64, Broken),
    (Openbsd, Ppc64, Ported),
    (Openbsd, Riscv64, Broken),
    (Plan9, I386, Ported),
    (Plan9, Amd64, Ported),
    (Plan9, Arm, Ported),
    (Solaris, Amd64, Ported),
    (Wasip1, Wasm, Ported),
    (Windows, I386, FirstClass),
    (Windows, Amd64, FirstClass),
    (Windows, Arm, Ported),
    (Windows, Arm64, Ported),
];

/// An OS/architecture pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Target {
    /// Operating system
    pub os: Os,
    /// CPU architecture
    pub arch: Arch,
}

impl Target {
    /// Creates a target from its parts.
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// The machine this binary runs on.
    pub fn host() -> Self {
        Self::new(Os::host(), Arch::host())
    }

    /// Parses OS and architecture names, rejecting unknown spellings as an
    /// unsupported target.
    pub fn parse(os: &str, arch: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedTarget {
            os: os.to_ascii_lowercase(),
            arch: arch.to_ascii_lowercase(),
        };
        let os_value = Os::from_str(os).map_err(|_| unsupported())?;
        let arch_value = Arch::from_str(arch).map_err(|_| unsupported())?;
        Ok(Self::new(os_value, arch_value))
    }

    /// Classification from [`SUPPORT_TABLE`], `None` when the pair is unknown.
    pub fn support(&self) -> Option<Support> {
        SUPPORT_TABLE
            .iter()
            .find(|(os, arch, _)| *os == self.os && *arch == self.arch)
            .map(|(_, _, support)| *support)
    }

    /// Only first-class targets are accepted as build targets.
    pub fn ensure_first_class(&self) -> Result<()> {
        match self.support() {
            Some(Support::FirstClass) => Ok(()),
            _ => Err(Error::UnsupportedTarget {
                os: self.os.to_string(),
                arch: self.arch.to_string(),
            }),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
