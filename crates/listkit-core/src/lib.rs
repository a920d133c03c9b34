mod codec;
pub use codec::{decode, encode};

mod fingerprint;
pub use fingerprint::Fingerprint;

mod store;
pub use store::FilterSortStore;

mod pager;
pub use pager::CursorPager;

mod machine;
pub use machine::FetchMachine;

mod source;
pub use source::CollectionSource;

mod sink;
pub use sink::{NullSink, RecordingSink, UrlSink};

mod controller;
pub use controller::{ControllerOptions, ControllerSnapshot, PageController};
