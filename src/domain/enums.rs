//! Enumerated configuration values
//!
//! Names match the configured text exactly, including case: `r4` is not a
//! valid `fhir_version`, `R4` is.

use std::fmt;

/// An enum whose constants are selected by their exact configured name.
pub trait ConfigEnum: Sized + Copy + 'static {
    /// Human-readable type name used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Every legal configured name, in declaration order.
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;

    fn name(&self) -> &'static str;
}

macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $type_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl ConfigEnum for $name {
            const TYPE_NAME: &'static str = $type_name;
            const NAMES: &'static [&'static str] = &[$($text),+];

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $text => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

config_enum! {
    /// FHIR release served by the server.
    FhirVersion, "FHIR version" {
        Dstu2 => "DSTU2",
        Dstu2Hl7Org => "DSTU2_HL7ORG",
        #[allow(non_camel_case_types)]
        Dstu2_1 => "DSTU2_1",
        Dstu3 => "DSTU3",
        R4 => "R4",
        R5 => "R5",
    }
}

config_enum! {
    /// Response encoding used when the client does not ask for one.
    Encoding, "encoding" {
        Json => "JSON",
        Xml => "XML",
        Rdf => "RDF",
    }
}

config_enum! {
    /// Whether the server emits and honours ETags.
    ETagSupport, "ETag support" {
        Enabled => "ENABLED",
        Disabled => "DISABLED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(FhirVersion::from_name("R4"), Some(FhirVersion::R4));
        assert_eq!(FhirVersion::from_name("r4"), None);
        assert_eq!(FhirVersion::from_name("DSTU2_1"), Some(FhirVersion::Dstu2_1));
    }

    #[test]
    fn every_name_resolves_to_a_constant() {
        for name in Encoding::NAMES {
            let value = Encoding::from_name(name).expect("listed name");
            assert_eq!(value.name(), *name);
        }
        assert_eq!(ETagSupport::Disabled.to_string(), "DISABLED");
    }
}
