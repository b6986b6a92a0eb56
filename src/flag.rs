//! POSIX-ish option parsing.
//!
//! Handles `--name`, `--name=value`, `-x`, `-xVALUE`, `-x VALUE`, bundled
//! booleans (`-abc`) and a `--` terminator. Flags and positionals may be
//! mixed freely; parsing does not stop at the first positional.
//!
//! ```
//! use webterm::flag::FlagSet;
//!
//! let mut flags = FlagSet::new();
//! flags.bool("all", Some('a'), false, "show hidden files");
//! flags.bool("long", Some('l'), false, "long listing format");
//! flags.parse(&["-la", "projects"]).unwrap();
//!
//! assert_eq!(flags.get_bool("all"), Some(true));
//! assert_eq!(flags.args(), Some(&["projects".to_string()][..]));
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("flag missing value: {0}")]
    MissingValue(String),
    #[error("invalid value {value:?} for {flag}")]
    InvalidValue { flag: String, value: String },
}

/// A settable flag value. Implement this to support more kinds than the
/// built-in bool, string and integer cells.
pub trait Value: fmt::Display + fmt::Debug {
    /// Parse and store `raw`. Booleans get `""` when set without a value.
    fn set(&mut self, raw: &str) -> Result<(), String>;

    /// Boolean flags never consume the following token.
    fn is_bool_flag(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolValue(pub bool);

impl fmt::Display for BoolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Value for BoolValue {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        self.0 = match raw {
            "" | "1" | "t" | "T" | "true" | "TRUE" | "True" => true,
            "0" | "f" | "F" | "false" | "FALSE" | "False" => false,
            other => return Err(format!("not a boolean: {}", other)),
        };
        Ok(())
    }

    fn is_bool_flag(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringValue(pub String);

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Value for StringValue {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        self.0 = raw.to_string();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntValue(pub i64);

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Value for IntValue {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        self.0 = raw.parse::<i64>().map_err(|e| e.to_string())?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct Flag {
    pub name: String,
    pub short: Option<char>,
    pub usage: String,
    pub value: Box<dyn Value>,
    /// Value at registration time, as text.
    pub default: String,
}

/// A set of registered flags plus the positionals left over from the last
/// [`FlagSet::parse`]. Register everything before parsing.
#[derive(Debug, Default)]
pub struct FlagSet {
    flags: BTreeMap<String, Flag>,
    short_to_long: HashMap<char, String>,
    args: Option<Vec<String>>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool(&mut self, name: &str, short: Option<char>, default: bool, usage: &str) {
        self.var(Box::new(BoolValue(default)), name, short, usage);
    }

    pub fn string(&mut self, name: &str, short: Option<char>, default: &str, usage: &str) {
        self.var(Box::new(StringValue(default.to_string())), name, short, usage);
    }

    pub fn int(&mut self, name: &str, short: Option<char>, default: i64, usage: &str) {
        self.var(Box::new(IntValue(default)), name, short, usage);
    }

    /// Register any [`Value`]. Re-registering a name replaces the old flag.
    pub fn var(&mut self, value: Box<dyn Value>, name: &str, short: Option<char>, usage: &str) {
        let flag = Flag {
            name: name.to_string(),
            short,
            usage: usage.to_string(),
            default: value.to_string(),
            value,
        };
        if let Some(c) = short {
            self.short_to_long.insert(c, name.to_string());
        }
        self.flags.insert(name.to_string(), flag);
    }

    /// Single left-to-right pass over `args`. Replaces whatever positionals
    /// a previous call captured.
    pub fn parse<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), FlagError> {
        let mut positional = Vec::new();
        // mark as parsed up front so args() reflects a failed parse too
        self.args = Some(Vec::new());

        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_ref();
            i += 1;

            if !arg.starts_with('-') || arg == "-" {
                positional.push(arg.to_string());
                continue;
            }

            if arg == "--" {
                positional.extend(args[i..].iter().map(|a| a.as_ref().to_string()));
                break;
            }

            if let Some(long) = arg.strip_prefix("--") {
                let (name, inline) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (long, None),
                };

                let flag = self
                    .flags
                    .get_mut(name)
                    .ok_or_else(|| FlagError::UnknownFlag(format!("--{}", name)))?;

                let value = match inline {
                    Some(value) => value,
                    None if flag.value.is_bool_flag() => "",
                    None => {
                        let next = args
                            .get(i)
                            .ok_or_else(|| FlagError::MissingValue(format!("--{}", name)))?;
                        i += 1;
                        next.as_ref()
                    }
                };

                set_value(flag, value, &format!("--{}", name))?;
                continue;
            }

            // bundle of short flags, e.g. -la or -ffile.txt
            let shorts = &arg[1..];
            for (offset, short) in shorts.char_indices() {
                let name = self
                    .short_to_long
                    .get(&short)
                    .ok_or_else(|| FlagError::UnknownFlag(format!("-{}", short)))?;
                let flag = self
                    .flags
                    .get_mut(name)
                    .ok_or_else(|| FlagError::UnknownFlag(format!("-{}", short)))?;
                let display = format!("-{}", short);

                if flag.value.is_bool_flag() {
                    set_value(flag, "", &display)?;
                    continue;
                }

                // rest of the token is the value, if there is any
                let rest = &shorts[offset + short.len_utf8()..];
                if !rest.is_empty() {
                    set_value(flag, rest, &display)?;
                    break;
                }

                let next = args
                    .get(i)
                    .ok_or_else(|| FlagError::MissingValue(display.clone()))?;
                i += 1;
                set_value(flag, next.as_ref(), &display)?;
            }
        }

        self.args = Some(positional);
        Ok(())
    }

    /// Positionals from the last parse, or `None` if nothing was parsed yet.
    pub fn args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }

    pub fn parsed(&self) -> bool {
        self.args.is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.downcast::<BoolValue>(name).map(|v| v.0)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.downcast::<StringValue>(name).map(|v| v.0.as_str())
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.downcast::<IntValue>(name).map(|v| v.0)
    }

    fn downcast<T: 'static>(&self, name: &str) -> Option<&T> {
        self.flags.get(name)?.value.as_any().downcast_ref::<T>()
    }

    /// One line per flag, sorted by long name.
    pub fn usage(&self) -> String {
        let mut out = Vec::with_capacity(self.flags.len());
        for flag in self.flags.values() {
            let names = match flag.short {
                Some(c) => format!("-{}, --{}", c, flag.name),
                None => format!("    --{}", flag.name),
            };
            out.push(format!("  {:<16}{}", names, flag.usage));
        }
        out.join("\n")
    }
}

fn set_value(flag: &mut Flag, raw: &str, display: &str) -> Result<(), FlagError> {
    flag.value.set(raw).map_err(|_| FlagError::InvalidValue {
        flag: display.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verbose_debug() -> FlagSet {
        let mut fs = FlagSet::new();
        fs.bool("verbose", Some('v'), false, "verbose output");
        fs.bool("debug", Some('d'), false, "debug mode");
        fs
    }

    #[test]
    fn test_bool_flags() {
        let cases: &[(&[&str], bool)] = &[
            (&["-v"], true),
            (&["--verbose"], true),
            (&["-vd"], true),
            (&[], false),
            (&["--verbose=true"], true),
            (&["--verbose=false"], false),
        ];
        for (args, want) in cases {
            let mut fs = verbose_debug();
            fs.parse(*args).unwrap();
            assert_eq!(fs.get_bool("verbose"), Some(*want), "args {:?}", args);
        }
    }

    #[test]
    fn test_bool_flag_bad_value() {
        let mut fs = verbose_debug();
        let err = fs.parse(&["--verbose=maybe"]).unwrap_err();
        assert!(matches!(err, FlagError::InvalidValue { .. }));
    }

    #[test]
    fn test_string_flags() {
        let cases: &[(&[&str], &str)] = &[
            (&["-f", "file.txt"], "file.txt"),
            (&["--file", "file.txt"], "file.txt"),
            (&["--file=file.txt"], "file.txt"),
            (&["-ffile.txt"], "file.txt"),
            (&[], "default.txt"),
        ];
        for (args, want) in cases {
            let mut fs = FlagSet::new();
            fs.string("file", Some('f'), "default.txt", "input file");
            fs.parse(*args).unwrap();
            assert_eq!(fs.get_str("file"), Some(*want), "args {:?}", args);
            assert_eq!(fs.args(), Some(&[][..]), "value must not leak into positionals");
        }
    }

    #[test]
    fn test_string_flag_missing_value() {
        for args in [&["-f"][..], &["--file"][..]] {
            let mut fs = FlagSet::new();
            fs.string("file", Some('f'), "default.txt", "input file");
            assert!(matches!(fs.parse(args), Err(FlagError::MissingValue(_))));
        }
    }

    #[test]
    fn test_combined_flags() {
        let mut fs = verbose_debug();
        fs.bool("all", Some('a'), false, "show all");
        fs.string("file", Some('f'), "", "input file");

        fs.parse(&["-vda", "-f", "test.txt"]).unwrap();
        assert_eq!(fs.get_bool("verbose"), Some(true));
        assert_eq!(fs.get_bool("debug"), Some(true));
        assert_eq!(fs.get_bool("all"), Some(true));
        assert_eq!(fs.get_str("file"), Some("test.txt"));
    }

    #[test]
    fn test_bundle_ending_in_value_flag() {
        let mut fs = verbose_debug();
        fs.string("file", Some('f'), "", "input file");

        fs.parse(&["-vfout.txt", "rest"]).unwrap();
        assert_eq!(fs.get_bool("verbose"), Some(true));
        assert_eq!(fs.get_str("file"), Some("out.txt"));
        assert_eq!(fs.args().unwrap(), ["rest"]);
    }

    #[test]
    fn test_positionals_and_terminator() {
        let mut fs = verbose_debug();
        fs.parse(&["-v", "arg1", "arg2", "--", "-not-a-flag", "--verbose"]).unwrap();
        assert_eq!(fs.args().unwrap(), ["arg1", "arg2", "-not-a-flag", "--verbose"]);
    }

    #[test]
    fn test_flags_after_positionals() {
        let mut fs = verbose_debug();
        fs.parse(&["arg", "-d", "-"]).unwrap();
        assert_eq!(fs.get_bool("debug"), Some(true));
        assert_eq!(fs.args().unwrap(), ["arg", "-"]);
    }

    #[test]
    fn test_unknown_flag() {
        let mut fs = verbose_debug();
        assert_eq!(fs.parse(&["-x"]), Err(FlagError::UnknownFlag("-x".to_string())));
        assert_eq!(
            fs.parse(&["--nope=1"]),
            Err(FlagError::UnknownFlag("--nope".to_string()))
        );
        // one bad letter spoils the bundle
        assert!(matches!(fs.parse(&["-vx"]), Err(FlagError::UnknownFlag(_))));
    }

    #[test]
    fn test_int_flag() {
        let mut fs = FlagSet::new();
        fs.int("count", Some('n'), 10, "how many");
        fs.parse(&["-n", "3"]).unwrap();
        assert_eq!(fs.get_int("count"), Some(3));

        assert!(matches!(fs.parse(&["--count=abc"]), Err(FlagError::InvalidValue { .. })));
    }

    #[test]
    fn test_lookup() {
        let fs = verbose_debug();
        let flag = fs.lookup("verbose").unwrap();
        assert_eq!(flag.name, "verbose");
        assert_eq!(flag.short, Some('v'));
        assert_eq!(flag.default, "false");
        assert!(fs.lookup("missing").is_none());
        // wrong type asks get None
        assert_eq!(fs.get_str("verbose"), None);
    }

    #[test]
    fn test_args_unset_until_parsed() {
        let mut fs = verbose_debug();
        assert!(!fs.parsed());
        assert_eq!(fs.args(), None);

        fs.parse::<&str>(&[]).unwrap();
        assert!(fs.parsed());
        assert_eq!(fs.args(), Some(&[][..]));
    }

    #[test]
    fn test_parse_overwrites_positionals() {
        let mut fs = verbose_debug();
        fs.parse(&["a", "b"]).unwrap();
        fs.parse(&["c"]).unwrap();
        assert_eq!(fs.args().unwrap(), ["c"]);
    }

    #[test]
    fn test_usage() {
        let mut fs = FlagSet::new();
        fs.bool("all", Some('a'), false, "show hidden files");
        fs.string("name", None, "", "a name");
        assert_eq!(
            fs.usage(),
            "  -a, --all       show hidden files\n      --name      a name"
        );
    }
}
