//! The embedded environment fetcher modules run in.
//!
//! Each candidate module gets its own interpreter with the standard
//! safe library plus two host constructors, `datetime` and `date`, so
//! fetchers can return proper date/time values instead of preformatted
//! strings. Both produce userdata exposing an `isoformat` method, which
//! is the capability the normalizer converts to text.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mlua::{Lua, MetaMethod, UserData, UserDataMethods};

/// A date-and-time value exposed to fetcher modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    /// ISO-8601 representation, seconds precision.
    pub fn iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

impl UserData for Timestamp {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("isoformat", |_, this, ()| Ok(this.iso8601()));
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.iso8601()));
    }
}

/// A calendar date value exposed to fetcher modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// ISO-8601 representation, `YYYY-MM-DD`.
    pub fn iso8601(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl UserData for Date {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("isoformat", |_, this, ()| Ok(this.iso8601()));
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.iso8601()));
    }
}

/// Build a fresh interpreter for one candidate module.
///
/// States are never shared between candidates, so loading one module
/// cannot affect another.
pub fn fetcher_lua() -> Result<Lua, mlua::Error> {
    let lua = Lua::new();
    let globals = lua.globals();
    globals.set("datetime", lua.create_function(datetime_ctor)?)?;
    globals.set("date", lua.create_function(date_ctor)?)?;
    Ok(lua)
}

type DatetimeArgs = (i32, u32, u32, Option<u32>, Option<u32>, Option<u32>);

fn datetime_ctor(
    _: &Lua,
    (year, month, day, hour, min, sec): DatetimeArgs,
) -> mlua::Result<Timestamp> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| mlua::Error::runtime(format!("invalid date: {year}-{month}-{day}")))?;
    let (hour, min, sec) = (hour.unwrap_or(0), min.unwrap_or(0), sec.unwrap_or(0));
    let time = NaiveTime::from_hms_opt(hour, min, sec)
        .ok_or_else(|| mlua::Error::runtime(format!("invalid time: {hour}:{min}:{sec}")))?;
    Ok(Timestamp(date.and_time(time)))
}

fn date_ctor(_: &Lua, (year, month, day): (i32, u32, u32)) -> mlua::Result<Date> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Date)
        .ok_or_else(|| mlua::Error::runtime(format!("invalid date: {year}-{month}-{day}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlua::Value;

    #[test]
    fn datetime_isoformat() {
        let lua = fetcher_lua().unwrap();
        let text: String = lua
            .load("datetime(2024, 1, 1, 8, 0, 0):isoformat()")
            .eval()
            .unwrap();
        assert_eq!(text, "2024-01-01T08:00:00");
    }

    #[test]
    fn datetime_defaults_to_midnight() {
        let lua = fetcher_lua().unwrap();
        let text: String = lua.load("datetime(2024, 3, 15):isoformat()").eval().unwrap();
        assert_eq!(text, "2024-03-15T00:00:00");
    }

    #[test]
    fn date_isoformat() {
        let lua = fetcher_lua().unwrap();
        let text: String = lua.load("date(2024, 12, 24):isoformat()").eval().unwrap();
        assert_eq!(text, "2024-12-24");
    }

    #[test]
    fn tostring_matches_isoformat() {
        let lua = fetcher_lua().unwrap();
        let text: String = lua
            .load("tostring(datetime(2024, 1, 1, 8, 0, 0))")
            .eval()
            .unwrap();
        assert_eq!(text, "2024-01-01T08:00:00");
    }

    #[test]
    fn invalid_components_raise() {
        let lua = fetcher_lua().unwrap();
        assert!(lua.load("datetime(2024, 2, 30)").eval::<Value>().is_err());
        assert!(
            lua.load("datetime(2024, 1, 1, 25, 0, 0)")
                .eval::<Value>()
                .is_err()
        );
        assert!(lua.load("date(2024, 13, 1)").eval::<Value>().is_err());
    }

    #[test]
    fn iso8601_pads_components() {
        let ts = Timestamp::new(
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
        );
        assert_eq!(ts.iso8601(), "2024-01-02T03:04:05");

        let d = Date::new(NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert_eq!(d.iso8601(), "2024-06-07");
    }
}
