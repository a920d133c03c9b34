use super::{FetchError, Page};

/// What one collection request is currently doing.
///
/// Exactly one phase is active at a time. `Success` carries the settled
/// page; `Failure` keeps the classified error for the view to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPhase<T> {
    Idle,
    Loading,
    Success(Page<T>),
    Failure(FetchError),
}

impl<T> FetchPhase<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchPhase::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchPhase::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchPhase::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchPhase::Failure(_))
    }

    pub fn page(&self) -> Option<&Page<T>> {
        match self {
            FetchPhase::Success(page) => Some(page),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchPhase::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// True when a settled page matched nothing: the view's "empty" display.
    pub fn is_empty_success(&self) -> bool {
        match self {
            FetchPhase::Success(page) => {
                page.items.is_empty() && page.total_count.unwrap_or(0) == 0
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_predicate_per_phase() {
        let idle: FetchPhase<u32> = FetchPhase::Idle;
        assert!(idle.is_idle() && !idle.is_loading());

        let loading: FetchPhase<u32> = FetchPhase::Loading;
        assert!(loading.is_loading() && !loading.is_success());

        let success = FetchPhase::Success(Page {
            items: vec![1u32],
            next_cursor: None,
            total_count: Some(1),
        });
        assert!(success.is_success());
        assert_eq!(success.page().map(|p| p.len()), Some(1));

        let failure: FetchPhase<u32> = FetchPhase::Failure(FetchError::Timeout("slow".into()));
        assert!(failure.is_failure());
        assert!(failure.error().is_some());
    }

    #[test]
    fn empty_success_is_distinguished() {
        let empty: FetchPhase<u32> = FetchPhase::Success(Page::empty());
        assert!(empty.is_empty_success());
        assert!(empty.is_success());

        let populated = FetchPhase::Success(Page {
            items: vec![9u32],
            next_cursor: None,
            total_count: Some(1),
        });
        assert!(!populated.is_empty_success());

        let failed: FetchPhase<u32> = FetchPhase::Failure(FetchError::Internal("x".into()));
        assert!(!failed.is_empty_success());
    }
}
