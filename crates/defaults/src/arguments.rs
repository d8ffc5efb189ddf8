use std::collections::BTreeMap;
use strata_domain::Value;

/// A source of named startup arguments copied into the Argument domain.
pub trait ArgumentSource {
    fn arguments(&self) -> Vec<(String, Value)>;
}

impl ArgumentSource for BTreeMap<String, Value> {
    fn arguments(&self) -> Vec<(String, Value)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl ArgumentSource for strata_domain::Domain {
    fn arguments(&self) -> Vec<(String, Value)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Named arguments given as `-key value` pairs on a command line.
///
/// A `-key` followed by another `-flag` or by nothing is skipped, as are bare words.
/// Negative numbers count as values, not keys.
/// Values are kept as strings; typed getters coerce them on read.
#[derive(Debug, Clone, Default)]
pub struct ProcessArguments {
    args: Vec<String>,
}

impl ProcessArguments {
    /// Reads the arguments of the current process, skipping the program name.
    #[must_use]
    pub fn from_env() -> Self {
        Self { args: std::env::args().skip(1).collect() }
    }

    #[must_use]
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { args: args.into_iter().map(Into::into).collect() }
    }
}

fn flag_name(arg: &str) -> Option<&str> {
    arg.strip_prefix('-').filter(|name| {
        !name.is_empty() && !name.starts_with('-') && name.parse::<f64>().is_err()
    })
}

impl ArgumentSource for ProcessArguments {
    fn arguments(&self) -> Vec<(String, Value)> {
        let mut pairs = Vec::new();
        let mut iter = self.args.iter().peekable();

        while let Some(arg) = iter.next() {
            let Some(key) = flag_name(arg) else {
                continue;
            };
            if let Some(value) = iter.next_if(|next| flag_name(next).is_none()) {
                pairs.push((key.to_owned(), Value::from(value.as_str())));
            }
        }
        pairs
    }
}
