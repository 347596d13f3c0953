use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    error::{DatasetError, Result},
    literal::Literal,
};

/// One row: field name to [`Literal`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Literal>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Literal) -> Option<Literal> {
        self.values.insert(field.into(), value)
    }

    pub fn get(&self, field: &str) -> Option<&Literal> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }

    /// Raw cell strings in the order of `fields`.
    pub fn project(&self, fields: &[String]) -> Result<Vec<String>> {
        fields
            .iter()
            .map(|field| {
                self.get(field)
                    .map(|lit| lit.as_str().to_string())
                    .ok_or_else(|| DatasetError::MissingField {
                        field: field.clone(),
                    })
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Literal>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.values
                .iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .join(", ")
        )
    }
}
