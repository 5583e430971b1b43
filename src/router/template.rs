use std::collections::HashMap;

use uuid::Uuid;

use super::RegistryError;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Text,
    Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Var { name: String, kind: VarKind },
}

/// Parsed path template such as `/equipment/{equipment-id:uuid}`.
/// A variable always spans exactly one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidTemplate {
            template: raw.to_string(),
            reason: reason.to_string(),
        };

        let rest = raw.strip_prefix('/').ok_or_else(|| invalid("must start with '/'"))?;
        if rest.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                segments: Vec::new(),
            });
        }

        let mut segments = Vec::new();
        for part in rest.split('/') {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }

            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(var) => {
                    let (name, kind) = match var.split_once(':') {
                        None => (var, VarKind::Text),
                        Some((name, "uuid")) => (name, VarKind::Uuid),
                        Some(_) => return Err(invalid("unknown variable type")),
                    };
                    if name.is_empty() {
                        return Err(invalid("unnamed variable"));
                    }
                    Segment::Var {
                        name: name.to_string(),
                        kind,
                    }
                }
                None if part.contains(['{', '}']) => return Err(invalid("variable must span a whole segment")),
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Literals in place, `None` for every variable. Two templates with the
    /// same shape match exactly the same paths.
    pub fn shape(&self) -> Vec<Option<&str>> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Some(text.as_str()),
                Segment::Var { .. } => None,
            })
            .collect()
    }

    /// `true` per literal segment. Compared lexicographically, the template
    /// whose leftmost differing segment is a literal sorts higher.
    pub fn specificity(&self) -> Vec<bool> {
        self.segments
            .iter()
            .map(|segment| matches!(segment, Segment::Literal(_)))
            .collect()
    }

    pub fn matches(&self, path: &[&str]) -> bool {
        self.segments.len() == path.len()
            && self.segments.iter().zip(path).all(|(segment, part)| match segment {
                Segment::Literal(text) => text == part,
                Segment::Var { .. } => !part.is_empty(),
            })
    }

    /// Extract the variables of a matching path, parsing typed ones
    pub fn capture(&self, path: &[&str]) -> Result<PathParams, ApiError> {
        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(path) {
            let Segment::Var { name, kind } = segment else {
                continue;
            };
            let value = match kind {
                VarKind::Text => Param::Text(part.to_string()),
                VarKind::Uuid => Param::Uuid(Uuid::parse_str(part).map_err(|_| {
                    ApiError::bad_request(format!("Invalid '{}': expected a valid UUID", name))
                })?),
            };
            params.values.insert(name.clone(), value);
        }
        Ok(params)
    }
}

/// Split a request path into segments; `/` has none
pub fn split_path(path: &str) -> Vec<&str> {
    match path.strip_prefix('/').unwrap_or(path) {
        "" => Vec::new(),
        rest => rest.split('/').collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Param {
    Text(String),
    Uuid(Uuid),
}

/// Variables captured from the request path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: HashMap<String, Param>,
}

impl PathParams {
    pub fn uuid(&self, name: &str) -> Option<Uuid> {
        match self.values.get(name) {
            Some(Param::Uuid(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Param::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}
