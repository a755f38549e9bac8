#[cfg(test)]
pub mod test {
    use std::fmt;
    use std::str::FromStr;

    use crate::record::{AsSlot, Slot};
    use crate::types::Complex;

    /// The canonical four-field record: an optional flag, two required
    /// numbers (one keyed through the `json` tag) and a required string.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Conf {
        pub a: bool,
        pub b: i32,
        pub c: i64,
        pub d: String,
    }

    crate::record! {
        Conf {
            #[lookup = "A,optional"] a,
            #[lookup = "B"] b,
            #[json = "C"] c,
            #[lookup = "D"] d,
        }
    }

    /// `Conf` plus a field whose `json` key differs from its `lookup` key.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ConfWithE {
        pub a: bool,
        pub b: i32,
        pub c: i64,
        pub d: String,
        pub e: String,
    }

    crate::record! {
        ConfWithE {
            #[lookup = "A,optional"] a,
            #[lookup = "B"] b,
            #[json = "C"] c,
            #[lookup = "D"] d,
            #[json = "E1"] #[lookup = "E2"] e,
        }
    }

    // -- Custom scanned type ----------------------------------------------------

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum Level {
        Debug,
        #[default]
        Info,
        Warn,
    }

    impl FromStr for Level {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "debug" => Ok(Level::Debug),
                "info" => Ok(Level::Info),
                "warn" => Ok(Level::Warn),
                other => Err(format!("unknown level '{other}'")),
            }
        }
    }

    impl fmt::Display for Level {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Level::Debug => "debug",
                Level::Info => "info",
                Level::Warn => "warn",
            })
        }
    }

    impl AsSlot for Level {
        fn as_slot(&mut self) -> Slot<'_> {
            Slot::Scan(self)
        }
    }

    // -- Tagged and untagged fields side by side --------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Mixed {
        pub port: u16,
        pub level: Level,
        pub scratch: String,
        pub ratio: f64,
    }

    crate::record! {
        Mixed {
            #[lookup = "PORT"] port,
            #[lookup = "LEVEL,optional"] level,
            scratch,
            #[json = "ratio,omitempty"] ratio,
        }
    }

    // -- One field of every kind ------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct AllKinds {
        pub text: String,
        pub blob: Vec<u8>,
        pub flag: bool,
        pub small: i8,
        pub wide: i64,
        pub count: usize,
        pub byte: u8,
        pub single: f32,
        pub double: f64,
        pub phase: Complex<f64>,
        pub level: Level,
    }

    crate::record! {
        AllKinds {
            #[lookup = "TEXT"] text,
            #[lookup = "BLOB"] blob,
            #[lookup = "FLAG"] flag,
            #[lookup = "SMALL"] small,
            #[lookup = "WIDE"] wide,
            #[lookup = "COUNT"] count,
            #[lookup = "BYTE"] byte,
            #[lookup = "SINGLE"] single,
            #[lookup = "DOUBLE"] double,
            #[lookup = "PHASE"] phase,
            #[lookup = "LEVEL"] level,
        }
    }

    // -- Record with a credential, for redaction -------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SecretConf {
        pub user: String,
        pub api_secret: String,
        pub spare_secret: String,
    }

    crate::record! {
        SecretConf {
            #[lookup = "USER"] user,
            #[lookup = "API_SECRET"] api_secret,
            #[lookup = "SPARE_SECRET,optional"] spare_secret,
        }
    }

    /// Report entries as `(key, value)` pairs of string slices, for comparing
    /// against a collected `Vec<(String, String)>`.
    pub fn entries<'a>(pairs: &'a [(String, String)]) -> Vec<(&'a str, &'a str)> {
        pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}
