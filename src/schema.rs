//! Field schemas.
//!
//! A [`Schema`] is the ordered list of `(name, type)` pairs that every record
//! of a stream follows. On the wire it occupies the first two data lines:
//!
//! ```text
//! a<TAB>b
//! int<TAB>text
//! ```
//!
//! ```rust
//! use row_format::{Schema, TypeTag};
//!
//! let schema = Schema::new(["a", "b"], [TypeTag::Int, TypeTag::Text]).unwrap();
//! assert_eq!(schema.header_line(), "a\tb\n");
//! assert_eq!(schema.type_line(), "int\ttext\n");
//! assert_eq!(schema.type_of("b"), Some(TypeTag::Text));
//! ```

use crate::escape::{escape, unescape};
use crate::line::split_fields;
use crate::{Error, Result, TypeTag};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Ordered field names and their declared types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
    types: Vec<TypeTag>,
}

impl Schema {
    /// Builds a schema from parallel name and type sequences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] if the sequences differ in length or
    /// are empty.
    pub fn new<N, T>(names: N, types: T) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        T: IntoIterator<Item = TypeTag>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let types: Vec<TypeTag> = types.into_iter().collect();
        if names.len() != types.len() {
            return Err(Error::schema_mismatch(format!(
                "{} field names but {} field types",
                names.len(),
                types.len()
            )));
        }
        if names.is_empty() {
            return Err(Error::schema_mismatch("schema has no fields"));
        }
        Ok(Schema { names, types })
    }

    /// Builds a schema from field names and type tag spellings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSchema`] if a tag is not in the vocabulary,
    /// and [`Error::SchemaMismatch`] as for [`Schema::new`].
    pub fn from_strs<N, S>(names: N, types: &[S]) -> Result<Self>
    where
        N: IntoIterator,
        N::Item: Into<String>,
        S: AsRef<str>,
    {
        let tags = types
            .iter()
            .map(|t| t.as_ref().parse::<TypeTag>())
            .collect::<Result<Vec<_>>>()
            .map_err(Error::malformed_schema)?;
        Schema::new(names, tags)
    }

    /// Builds a schema from the raw header and type lines of a stream.
    ///
    /// Both lines are split on tabs and unescaped.
    ///
    /// # Errors
    ///
    /// Any inconsistency is reported as [`Error::MalformedSchema`].
    pub fn from_lines(header: &str, types: &str) -> Result<Self> {
        let names = split_fields(header)
            .map(|token| {
                unescape(token)
                    .map(|name| name.into_owned())
                    .ok_or_else(|| Error::malformed_schema("field name is null"))
            })
            .collect::<Result<Vec<_>>>()?;
        let tags = split_fields(types)
            .map(|token| match unescape(token) {
                Some(tag) => tag.parse::<TypeTag>().map_err(Error::malformed_schema),
                None => Err(Error::malformed_schema("field type is null")),
            })
            .collect::<Result<Vec<_>>>()?;
        Schema::new(names, tags).map_err(|e| match e {
            Error::SchemaMismatch(msg) => Error::MalformedSchema(msg),
            other => other,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn field_types(&self) -> &[TypeTag] {
        &self.types
    }

    /// Returns the name to type mapping, in field order.
    ///
    /// With duplicate names the last declaration wins.
    #[must_use]
    pub fn types_by_name(&self) -> IndexMap<String, TypeTag> {
        self.iter().map(|(n, t)| (n.to_string(), t)).collect()
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<TypeTag> {
        self.position(name).map(|i| self.types[i])
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TypeTag)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.types.iter().copied())
    }

    /// Returns the first field name that occurs more than once.
    #[must_use]
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.names.len());
        self.names
            .iter()
            .find(|n| !seen.insert(n.as_str()))
            .map(String::as_str)
    }

    /// Renders the escaped header line, newline included.
    #[must_use]
    pub fn header_line(&self) -> String {
        join_line(self.names.iter().map(|n| escape(Some(n.as_str()))))
    }

    /// Renders the type line, newline included.
    #[must_use]
    pub fn type_line(&self) -> String {
        join_line(self.types.iter().map(|t| t.as_str().into()))
    }
}

pub(crate) fn join_line<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = std::borrow::Cow<'a, str>>,
{
    let mut line = String::new();
    for (i, token) in tokens.into_iter().enumerate() {
        if i > 0 {
            line.push('\t');
        }
        line.push_str(&token);
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch() {
        let err = Schema::new(["a", "b"], [TypeTag::Int]).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_empty_schema_rejected() {
        let err = Schema::new(Vec::<String>::new(), Vec::<TypeTag>::new()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_from_strs_unknown_tag() {
        let err = Schema::from_strs(["a"], &["integer"]).unwrap_err();
        assert!(matches!(err, Error::MalformedSchema(_)));
    }

    #[test]
    fn test_from_lines() {
        let schema = Schema::from_lines("a\\tb\tc", "int\tdatetime").unwrap();
        assert_eq!(schema.field_names(), &["a\tb".to_string(), "c".to_string()]);
        assert_eq!(schema.field_types(), &[TypeTag::Int, TypeTag::DateTime]);
    }

    #[test]
    fn test_from_lines_rejects() {
        assert!(matches!(
            Schema::from_lines("a\tb", "int"),
            Err(Error::MalformedSchema(_))
        ));
        assert!(matches!(
            Schema::from_lines("a\tb", "int\tstring"),
            Err(Error::MalformedSchema(_))
        ));
        assert!(matches!(
            Schema::from_lines("\\N", "int"),
            Err(Error::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_header_is_escaped() {
        let schema = Schema::new(["#id", "x"], [TypeTag::Int, TypeTag::Bool]).unwrap();
        assert_eq!(schema.header_line(), "\\#id\tx\n");
        let back = Schema::from_lines("\\#id\tx", "int\tbool").unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_duplicate_name() {
        let schema = Schema::new(["a", "b", "a"], [TypeTag::Int; 3]).unwrap();
        assert_eq!(schema.duplicate_name(), Some("a"));
        assert_eq!(schema.types_by_name().len(), 2);
    }
}
