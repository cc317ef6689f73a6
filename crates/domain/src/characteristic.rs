//! Characteristic — an addressable data point within a service.
//!
//! Properties and permissions are closed sets stored as small bitsets.
//! Control-plane input is parsed permissively: unrecognized tokens are
//! dropped, and an empty result falls back to the default set.

use serde::{Deserialize, Serialize};

use crate::id::AttributeUuid;

/// A GATT characteristic property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Read,
    Write,
    WriteWithoutResponse,
    Notify,
    Indicate,
}

impl Property {
    const ALL: [Self; 5] = [
        Self::Read,
        Self::Write,
        Self::WriteWithoutResponse,
        Self::Notify,
        Self::Indicate,
    ];

    /// Parse a control-plane token (`read`, `writeWithoutResponse`,
    /// `write_without_response`, …). Case and `-`/`_` separators are ignored.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match squash(token).as_str() {
            "read" => Some(Self::Read),
            "write" => Some(Self::Write),
            "writewithoutresponse" => Some(Self::WriteWithoutResponse),
            "notify" => Some(Self::Notify),
            "indicate" => Some(Self::Indicate),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::WriteWithoutResponse => "writeWithoutResponse",
            Self::Notify => "notify",
            Self::Indicate => "indicate",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// An ATT access permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Readable,
    Writeable,
}

impl Permission {
    const ALL: [Self; 2] = [Self::Readable, Self::Writeable];

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match squash(token).as_str() {
            "readable" => Some(Self::Readable),
            "writeable" | "writable" => Some(Self::Writeable),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Readable => "readable",
            Self::Writeable => "writeable",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

fn squash(token: &str) -> String {
    token
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! define_flag_set {
    ($(#[doc = $doc:expr])* $name:ident, $flag:ident, [$($default:ident),+]) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        #[serde(from = "Vec<String>", into = "Vec<String>")]
        pub struct $name(u8);

        impl $name {
            /// The set used when a command supplies none.
            #[must_use]
            pub fn default_set() -> Self {
                Self::empty()$(.with($flag::$default))+
            }

            #[must_use]
            pub fn empty() -> Self {
                Self(0)
            }

            #[must_use]
            pub fn with(self, flag: $flag) -> Self {
                Self(self.0 | flag.bit())
            }

            #[must_use]
            pub fn contains(self, flag: $flag) -> bool {
                self.0 & flag.bit() != 0
            }

            #[must_use]
            pub fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Parse tokens, silently dropping unrecognized ones.
            pub fn from_tokens<I, S>(tokens: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: AsRef<str>,
            {
                tokens
                    .into_iter()
                    .filter_map(|t| $flag::from_token(t.as_ref()))
                    .fold(Self::empty(), Self::with)
            }

            /// Substitute the default set when empty.
            #[must_use]
            pub fn or_default_set(self) -> Self {
                if self.is_empty() { Self::default_set() } else { self }
            }

            pub fn iter(self) -> impl Iterator<Item = $flag> {
                $flag::ALL.into_iter().filter(move |f| self.contains(*f))
            }
        }

        impl FromIterator<$flag> for $name {
            fn from_iter<T: IntoIterator<Item = $flag>>(iter: T) -> Self {
                iter.into_iter().fold(Self::empty(), Self::with)
            }
        }

        impl From<Vec<String>> for $name {
            fn from(tokens: Vec<String>) -> Self {
                Self::from_tokens(tokens)
            }
        }

        impl From<$name> for Vec<String> {
            fn from(set: $name) -> Self {
                set.iter().map(|f| f.name().to_string()).collect()
            }
        }
    };
}

define_flag_set!(
    /// Set of [`Property`] flags. Defaults to `{read, write, notify}`.
    PropertySet,
    Property,
    [Read, Write, Notify]
);

define_flag_set!(
    /// Set of [`Permission`] flags. Defaults to `{readable, writeable}`.
    PermissionSet,
    Permission,
    [Readable, Writeable]
);

/// A registered characteristic. Its value lives in the value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub uuid: AttributeUuid,
    pub service_uuid: AttributeUuid,
    pub properties: PropertySet,
    pub permissions: PermissionSet,
}

impl Characteristic {
    /// Create a builder for constructing a [`Characteristic`].
    #[must_use]
    pub fn builder(uuid: AttributeUuid, service_uuid: AttributeUuid) -> CharacteristicBuilder {
        CharacteristicBuilder {
            uuid,
            service_uuid,
            properties: PropertySet::empty(),
            permissions: PermissionSet::empty(),
        }
    }

    /// Centrals may read it: declares `read` and grants `readable`.
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.properties.contains(Property::Read) && self.permissions.contains(Permission::Readable)
    }

    /// Centrals may write it: declares `write` or `writeWithoutResponse`
    /// and grants `writeable`.
    #[must_use]
    pub fn is_writeable(&self) -> bool {
        (self.properties.contains(Property::Write)
            || self.properties.contains(Property::WriteWithoutResponse))
            && self.permissions.contains(Permission::Writeable)
    }

    /// Centrals may subscribe to it.
    #[must_use]
    pub fn is_subscribable(&self) -> bool {
        self.properties.contains(Property::Notify) || self.properties.contains(Property::Indicate)
    }
}

/// Listing row for a characteristic: its definition plus value-store facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicInfo {
    #[serde(flatten)]
    pub characteristic: Characteristic,
    pub has_value: bool,
    pub subscribers: usize,
}

/// Builder for [`Characteristic`]; empty flag sets become the defaults.
#[derive(Debug)]
pub struct CharacteristicBuilder {
    uuid: AttributeUuid,
    service_uuid: AttributeUuid,
    properties: PropertySet,
    permissions: PermissionSet,
}

impl CharacteristicBuilder {
    #[must_use]
    pub fn properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    #[must_use]
    pub fn build(self) -> Characteristic {
        Characteristic {
            uuid: self.uuid,
            service_uuid: self.service_uuid,
            properties: self.properties.or_default_set(),
            permissions: self.permissions.or_default_set(),
        }
    }
}
