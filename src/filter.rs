use crate::types::{PubInfo, SourceInfo};

/// Routing rule: a text condition plus source-name and publisher-name glob
/// lists. An empty glob list matches everything. The condition is compiled
/// when the filter is registered with the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub cond: String,
    pub sources: Vec<String>,
    pub pubs: Vec<String>,
}

impl Filter {
    pub fn new(cond: impl Into<String>) -> Self {
        Self {
            cond: cond.into(),
            ..Default::default()
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_pubs(mut self, pubs: Vec<String>) -> Self {
        self.pubs = pubs;
        self
    }

    pub(crate) fn match_src(&self, info: &SourceInfo) -> bool {
        match_any_glob(&info.name, &self.sources)
    }

    pub(crate) fn match_pub(&self, info: &PubInfo) -> bool {
        match_any_glob(&info.name, &self.pubs)
    }
}

/// A name matches an empty glob list, or any entry that is a literal prefix
/// or suffix of it. Only these two forms are supported; existing
/// configurations rely on this behavior.
pub(crate) fn match_any_glob(name: &str, globs: &[String]) -> bool {
    if globs.is_empty() {
        return true;
    }
    globs
        .iter()
        .any(|g| name.starts_with(g.as_str()) || name.ends_with(g.as_str()))
}

/// Any-pair glob match; an empty value list or an empty glob list passes.
pub(crate) fn match_any_glob_any(values: &[String], globs: &[String]) -> bool {
    if values.is_empty() || globs.is_empty() {
        return true;
    }
    values.iter().any(|v| match_any_glob(v, globs))
}

/// Indices of all entries satisfying the predicate, in original order.
pub(crate) fn choose_filters<T>(filters: &[T], pred: impl Fn(&T) -> bool) -> Vec<usize> {
    filters
        .iter()
        .enumerate()
        .filter(|(_, f)| pred(f))
        .map(|(i, _)| i)
        .collect()
}
