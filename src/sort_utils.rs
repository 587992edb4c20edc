/// Sort direction for table columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Sort indicator for a column header.
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// Active sort: one column key plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: &'static str,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: &'static str) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: &'static str) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.key == key
    }
}

/// The sort that clicking `key` produces: the active key flips direction,
/// any other key starts ascending.
pub fn next_sort(current: Option<&SortSpec>, key: &'static str) -> SortSpec {
    match current {
        Some(spec) if spec.is_active(key) => SortSpec {
            key,
            direction: spec.direction.toggle(),
        },
        _ => SortSpec::asc(key),
    }
}

/// Trait for query params that carry sort state (`sort=<key>&dir=<asc|desc>`).
pub trait Sortable {
    fn sort_by(&self) -> Option<&String>;
    fn sort_dir(&self) -> Option<&String>;

    /// Resolve the sort against the keys a table can sort by. An absent or
    /// unknown key falls back to `default`.
    fn resolve_sort(
        &self,
        sortable_keys: &[&'static str],
        default: Option<SortSpec>,
    ) -> Option<SortSpec> {
        let Some(requested) = self.sort_by() else {
            return default;
        };

        match sortable_keys.iter().find(|key| **key == requested.as_str()) {
            Some(key) => Some(SortSpec {
                key: *key,
                direction: self
                    .sort_dir()
                    .map(|s| SortDirection::from_str(s))
                    .unwrap_or_default(),
            }),
            None => default,
        }
    }
}
