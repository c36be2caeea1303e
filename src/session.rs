use crate::speech::DEFAULT_LANGUAGE;

/// Per-run selection state, passed explicitly to whatever renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub district: Option<String>,
    pub language: String,
}

impl Session {
    pub fn new(language: Option<&str>) -> Self {
        Self {
            district: None,
            language: language.unwrap_or(DEFAULT_LANGUAGE).to_string(),
        }
    }

    pub fn select(&mut self, district_id: impl Into<String>) {
        let id = district_id.into();
        self.district = if id.is_empty() { None } else { Some(id) };
    }

    pub fn clear(&mut self) {
        self.district = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.district.as_deref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_clears() {
        let mut session = Session::default();
        assert_eq!(session.language, "hi-IN");
        session.select("MH-PUNE");
        assert_eq!(session.selected(), Some("MH-PUNE"));
        session.select("");
        assert_eq!(session.selected(), None);
        session.select("UP-LKO");
        session.clear();
        assert!(session.selected().is_none());
    }
}
