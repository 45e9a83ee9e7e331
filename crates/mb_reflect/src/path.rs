//! Property path tokenization.
//!
//! A property path is a sequence of dot-separated segments, each naming a
//! property and optionally indexing into it: `order.items[2].price`. Parsing
//! is lazy: a [`PathSegment`] splits off the first segment only, and exposes
//! the untouched remainder through [`PathSegment::children`].

use std::fmt;

// -----------------------------------------------------------------------------
// Path segment

/// The leading segment of a property path, plus the unparsed remainder.
///
/// Splitting never fails; a malformed `[` without a closing `]` is kept as
/// part of the plain name.
///
/// # Examples
///
/// ```
/// use mb_reflect::path::PathSegment;
///
/// let seg = PathSegment::parse("items[2].price");
/// assert_eq!(seg.name(), "items");
/// assert_eq!(seg.index(), Some("2"));
/// assert_eq!(seg.indexed_name(), "items[2]");
/// assert_eq!(seg.children(), Some("price"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment<'p> {
    name: &'p str,
    indexed_name: &'p str,
    index: Option<&'p str>,
    children: Option<&'p str>,
}

impl<'p> PathSegment<'p> {
    /// Splits `path` at the first `.` and decomposes the head into a name
    /// and an optional `[index]` suffix.
    pub fn parse(path: &'p str) -> Self {
        let (head, children) = match path.find('.') {
            Some(dot) => (&path[..dot], Some(&path[dot + 1..])),
            None => (path, None),
        };
        let (name, index) = match head.find('[') {
            Some(open) if head.ends_with(']') => {
                (&head[..open], Some(&head[open + 1..head.len() - 1]))
            }
            _ => (head, None),
        };
        PathSegment {
            name,
            indexed_name: head,
            index,
            children,
        }
    }

    /// The property name of this segment, without any index.
    pub fn name(&self) -> &'p str {
        self.name
    }

    /// The segment as written, index included.
    pub fn indexed_name(&self) -> &'p str {
        self.indexed_name
    }

    /// The raw text between `[` and `]`, if this segment is indexed.
    ///
    /// For sequences this is a numeric position; for maps it is a key.
    /// Interpretation is deferred to the wrapper resolving the segment.
    pub fn index(&self) -> Option<&'p str> {
        self.index
    }

    /// The unparsed remainder after the first `.`, if any.
    pub fn children(&self) -> Option<&'p str> {
        self.children
    }

    /// Whether further segments follow this one.
    pub fn has_next(&self) -> bool {
        self.children.is_some()
    }

    /// Parses the remainder into its own leading segment.
    pub fn next(&self) -> Option<PathSegment<'p>> {
        self.children.map(PathSegment::parse)
    }

    /// Iterates over every segment of the path, in order.
    pub fn iter(path: &'p str) -> Segments<'p> {
        Segments {
            rest: Some(path),
        }
    }
}

impl fmt::Display for PathSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.children {
            Some(rest) => write!(f, "{}.{}", self.indexed_name, rest),
            None => f.write_str(self.indexed_name),
        }
    }
}

/// Iterator over the segments of a property path, produced by
/// [`PathSegment::iter`].
#[derive(Debug, Clone)]
pub struct Segments<'p> {
    rest: Option<&'p str>,
}

impl<'p> Iterator for Segments<'p> {
    type Item = PathSegment<'p>;

    fn next(&mut self) -> Option<Self::Item> {
        let seg = PathSegment::parse(self.rest?);
        self.rest = seg.children();
        Some(seg)
    }
}

// -----------------------------------------------------------------------------
// Accessor naming conventions

/// Recognition of conventional accessor method names.
///
/// Methods named `get_x`, `set_x` or `is_x` are treated as accessors for a
/// property `x`. The `is_` form marks boolean-style getters, which win ties
/// against `get_` candidates of the same boolean type.
pub mod naming {
    /// Strips the accessor prefix from a method name, if it carries one.
    pub fn property_of(method: &str) -> Option<&str> {
        if let Some(rest) = method.strip_prefix("is_") {
            if !rest.is_empty() {
                return Some(rest);
            }
        }
        if let Some(rest) = method.strip_prefix("get_").or_else(|| method.strip_prefix("set_")) {
            if !rest.is_empty() {
                return Some(rest);
            }
        }
        None
    }

    /// Whether the method name is a getter form (`get_x` or `is_x`).
    pub fn is_getter(method: &str) -> bool {
        (method.starts_with("get_") && method.len() > 4)
            || (method.starts_with("is_") && method.len() > 3)
    }

    /// Whether the method name is a setter form (`set_x`).
    pub fn is_setter(method: &str) -> bool {
        method.starts_with("set_") && method.len() > 4
    }

    /// Whether the method name is the boolean-style getter form.
    pub fn is_bool_getter(method: &str) -> bool {
        method.starts_with("is_") && method.len() > 3
    }

    /// Filters out internal slots that must never surface as properties.
    pub fn is_valid_property(name: &str) -> bool {
        !name.is_empty() && !name.starts_with("__")
    }
}

// -----------------------------------------------------------------------------
