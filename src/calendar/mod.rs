mod grid;
mod layout;
mod util;
mod widget;
pub(crate) use self::grid::{MonthGrid, OutOfTimeError};
pub(crate) use self::util::{format_dmy, MonthExt};
pub(crate) use self::widget::Calendar;
