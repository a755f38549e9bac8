//! Records as explicit, ordered lists of typed field slots.
//!
//! A [`Record`] hands out one [`Field`] per struct member, in declaration
//! order. Each field borrows its member mutably through a [`Slot`], whose
//! variant tells the coercion engine what the raw string must become. The
//! [`record!`](crate::record!) macro writes the impl for plain structs.

use std::fmt;
use std::str::FromStr;

use crate::tags::Tags;
use crate::types::Complex;

/// A structure whose fields can be filled by [`fill`](crate::fill).
pub trait Record {
    /// Fields in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// One named, tagged slot of a record.
pub struct Field<'a> {
    pub name: &'static str,
    pub tags: Tags,
    pub slot: Slot<'a>,
}

impl<'a> Field<'a> {
    pub fn new<T: AsSlot + ?Sized>(name: &'static str, tags: Tags, target: &'a mut T) -> Self {
        Self {
            name,
            tags,
            slot: target.as_slot(),
        }
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("type", &self.slot.type_name())
            .finish()
    }
}

/// Mutable access to a field, by native type.
pub enum Slot<'a> {
    Str(&'a mut String),
    /// Raw binary payload, filled from base64.
    Bytes(&'a mut Vec<u8>),
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Complex32(&'a mut Complex<f32>),
    Complex64(&'a mut Complex<f64>),
    /// Any other type, filled by scanning a single token.
    Scan(&'a mut dyn Scan),
}

impl Slot<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Str(_) => "string",
            Slot::Bytes(_) => "bytes (base64)",
            Slot::Bool(_) => "bool",
            Slot::I8(_) => "i8",
            Slot::I16(_) => "i16",
            Slot::I32(_) => "i32",
            Slot::I64(_) => "i64",
            Slot::Isize(_) => "isize",
            Slot::U8(_) => "u8",
            Slot::U16(_) => "u16",
            Slot::U32(_) => "u32",
            Slot::U64(_) => "u64",
            Slot::Usize(_) => "usize",
            Slot::F32(_) => "f32",
            Slot::F64(_) => "f64",
            Slot::Complex32(_) => "complex (f32)",
            Slot::Complex64(_) => "complex (f64)",
            Slot::Scan(target) => target.type_name(),
        }
    }
}

/// Types that can be the target of a field.
///
/// Implemented for the built-in kinds. Custom types that implement
/// `FromStr + Display` opt in with a one-line impl:
///
/// ```ignore
/// impl AsSlot for Level {
///     fn as_slot(&mut self) -> Slot<'_> {
///         Slot::Scan(self)
///     }
/// }
/// ```
pub trait AsSlot {
    fn as_slot(&mut self) -> Slot<'_>;
}

macro_rules! as_slot {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl AsSlot for $ty {
                fn as_slot(&mut self) -> Slot<'_> {
                    Slot::$variant(self)
                }
            }
        )*
    };
}

as_slot! {
    String => Str,
    Vec<u8> => Bytes,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Complex<f32> => Complex32,
    Complex<f64> => Complex64,
}

/// Parse-from-one-token capability used for types outside the built-in set.
///
/// Blanket-implemented for every `FromStr + Display` type. The engine isolates
/// the token; an implementation only has to parse it and must leave `self`
/// untouched on failure.
pub trait Scan {
    fn scan_token(&mut self, token: &str) -> Result<(), String>;

    fn type_name(&self) -> &'static str;

    /// The current value, as handed to reporters.
    fn render(&self) -> String;
}

impl<T> Scan for T
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    fn scan_token(&mut self, token: &str) -> Result<(), String> {
        *self = token.parse().map_err(|e: T::Err| e.to_string())?;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// Implement [`Record`] for a struct by listing its fields in order.
///
/// Tags are written as attributes in front of each field name. Fields listed
/// without tags are part of the record but never looked up.
///
/// ```ignore
/// struct Conf { a: bool, b: i32, c: i64, scratch: String }
///
/// lookfig::record! {
///     Conf {
///         #[lookup = "A,optional"] a,
///         #[lookup = "B"] b,
///         #[json = "C"] c,
///         scratch,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $( $( #[$system:ident = $tag:literal] )* $field:ident ),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields(&mut self) -> ::std::vec::Vec<$crate::Field<'_>> {
                ::std::vec![
                    $(
                        $crate::Field::new(
                            ::core::stringify!($field),
                            $crate::Tags::new() $( .$system($tag) )*,
                            &mut self.$field,
                        )
                    ),*
                ]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Conf, Level, Mixed};

    #[test]
    fn macro_lists_fields_in_declaration_order() {
        let mut conf = Conf::default();
        let names: Vec<_> = conf.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn macro_attaches_tags() {
        let mut conf = Conf::default();
        let fields = conf.fields();
        assert_eq!(fields[0].tags, Tags::new().lookup("A,optional"));
        assert_eq!(fields[2].tags, Tags::new().json("C"));
    }

    #[test]
    fn untagged_fields_are_still_listed() {
        let mut mixed = Mixed::default();
        let fields = mixed.fields();
        let scratch = fields.iter().find(|f| f.name == "scratch").unwrap();
        assert_eq!(scratch.tags, Tags::new());
    }

    #[test]
    fn slots_match_native_types() {
        let mut conf = Conf::default();
        let fields = conf.fields();
        assert!(matches!(fields[0].slot, Slot::Bool(_)));
        assert!(matches!(fields[1].slot, Slot::I32(_)));
        assert!(matches!(fields[2].slot, Slot::I64(_)));
        assert!(matches!(fields[3].slot, Slot::Str(_)));
    }

    #[test]
    fn custom_type_scans_through_from_str() {
        let mut level = Level::Info;
        assert!(level.scan_token("debug").is_ok());
        assert_eq!(level, Level::Debug);
        assert!(level.scan_token("loud").is_err());
        assert_eq!(level, Level::Debug);
        assert_eq!(level.render(), "debug");
    }

    #[test]
    fn slot_writes_through_to_field() {
        let mut port = 0u16;
        if let Slot::U16(target) = port.as_slot() {
            *target = 8080;
        }
        assert_eq!(port, 8080);
    }
}
