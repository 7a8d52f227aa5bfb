use rwl_model::DryRun;

/// Query string of a RAPI request.
///
/// Boolean flags are only sent when set, as `1`. Tags are sent as one `tag`
/// parameter per tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Query(Vec<(&'static str, String)>);

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn flag(mut self, key: &'static str, on: bool) -> Self {
        if on {
            self.0.push((key, "1".to_string()));
        }
        self
    }

    pub(crate) fn dry_run(self, dry_run: DryRun) -> Self {
        self.flag("dry-run", dry_run.is_enabled())
    }

    pub(crate) fn bulk(self, bulk: bool) -> Self {
        self.flag("bulk", bulk)
    }

    pub(crate) fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.push((key, value.into()));
        self
    }

    pub(crate) fn opt(self, key: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    pub(crate) fn tags(mut self, tags: &[String]) -> Self {
        self.0.extend(tags.iter().map(|t| ("tag", t.clone())));
        self
    }

    pub(crate) fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}
