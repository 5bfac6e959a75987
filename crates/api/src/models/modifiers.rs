use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Java reflection modifier bitmask (`java.lang.reflect.Modifier`).
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, JsonSchema,
)]
#[serde(transparent)]
pub struct Modifiers(pub u32);

impl Modifiers {
    pub const PUBLIC: u32 = 1;
    pub const PRIVATE: u32 = 2;
    pub const PROTECTED: u32 = 4;
    pub const STATIC: u32 = 8;
    pub const FINAL: u32 = 16;
    pub const SYNCHRONIZED: u32 = 32;
    pub const VOLATILE: u32 = 64;
    pub const TRANSIENT: u32 = 128;
    pub const NATIVE: u32 = 256;
    pub const INTERFACE: u32 = 512;
    pub const ABSTRACT: u32 = 1024;
    pub const STRICT: u32 = 2048;

    /// Keyword order used by `Modifier.toString`.
    const ORDER: [(u32, &'static str); 12] = [
        (Self::PUBLIC, "public"),
        (Self::PROTECTED, "protected"),
        (Self::PRIVATE, "private"),
        (Self::ABSTRACT, "abstract"),
        (Self::STATIC, "static"),
        (Self::FINAL, "final"),
        (Self::TRANSIENT, "transient"),
        (Self::VOLATILE, "volatile"),
        (Self::SYNCHRONIZED, "synchronized"),
        (Self::NATIVE, "native"),
        (Self::STRICT, "strictfp"),
        (Self::INTERFACE, "interface"),
    ];

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }

    pub fn is_public(&self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_static(&self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_interface(&self) -> bool {
        self.contains(Self::INTERFACE)
    }

    pub fn keywords(&self) -> Vec<&'static str> {
        Self::ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Parses a single keyword back into its flag.
    pub fn flag_for(keyword: &str) -> Option<u32> {
        Self::ORDER
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(keyword))
            .map(|(flag, _)| *flag)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keywords().join(" "))
    }
}

impl From<u32> for Modifiers {
    fn from(bits: u32) -> Self {
        Modifiers(bits)
    }
}
