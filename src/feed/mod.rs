pub mod calendar;
pub mod commands;
pub mod pager;

pub use calendar::{DayCell, MonthGrid, YearMonth, MONTH_PAGE_SIZE};
pub use pager::{FeedFilter, FeedItem, FeedPager, FeedView};
