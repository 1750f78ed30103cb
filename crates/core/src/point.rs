//! Spatiotemporal point records
//!
//! A [`Point`] is an observation at a (longitude, latitude, date) location.
//! It carries no time coordinate of its own: scaling with a time-scale
//! produces a separate [`ScaledPoint`], so the base collection can be shared
//! read-only between configurations that use different scales.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reference from which a point's day offset is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeEpoch {
    /// January 1 of each point's own year (day-of-year, 1-based).
    #[default]
    StartOfYear,
    /// A fixed calendar date; that date itself is day 1.
    Date(NaiveDate),
}

/// A raw observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub site_id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub date: NaiveDate,
    pub value: f64,
}

impl Point {
    pub fn new(
        site_id: impl Into<String>,
        longitude: f64,
        latitude: f64,
        date: NaiveDate,
        value: f64,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            longitude,
            latitude,
            date,
            value,
        }
    }

    /// Build a point from split calendar fields, as found in record files.
    pub fn from_ymd(
        site_id: impl Into<String>,
        year: i32,
        month: u32,
        day: u32,
        longitude: f64,
        latitude: f64,
        value: f64,
    ) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::invalid("date", format!("{year}-{month}-{day}"), "not a calendar date")
        })?;
        Ok(Self::new(site_id, longitude, latitude, date, value))
    }

    /// Days since `epoch`, counting the epoch day as 1.
    pub fn day_offset(&self, epoch: TimeEpoch) -> i64 {
        match epoch {
            TimeEpoch::StartOfYear => i64::from(self.date.ordinal()),
            TimeEpoch::Date(start) => self.date.signed_duration_since(start).num_days() + 1,
        }
    }

    /// Project this point into (x, y, scaled-time) space.
    ///
    /// `ordinal` is the point's position in the collection it came from and
    /// is what ties are broken on.
    pub fn scale(&self, ordinal: usize, time_scale: f64, epoch: TimeEpoch) -> ScaledPoint {
        let day = self.day_offset(epoch) as f64;
        ScaledPoint {
            ordinal,
            x: self.longitude,
            y: self.latitude,
            t: time_scale * day,
            day,
            value: self.value,
        }
    }
}

/// A point placed in the 3-D index space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledPoint {
    /// Position in the source collection
    pub ordinal: usize,
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
    /// Scaled time: `time_scale * day`
    pub t: f64,
    /// Unscaled day offset
    pub day: f64,
    /// Observed value
    pub value: f64,
}

impl ScaledPoint {
    /// Coordinate along `axis` (0 = x, 1 = y, 2 = t).
    #[inline]
    pub fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.t,
        }
    }

    /// Squared 3-D Euclidean distance
    #[inline]
    pub fn dist_sq(&self, other: &ScaledPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dt = self.t - other.t;
        dx * dx + dy * dy + dt * dt
    }

    /// 3-D Euclidean distance over (x, y, scaled time)
    #[inline]
    pub fn distance(&self, other: &ScaledPoint) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// Distance in the (x, y) plane only
    #[inline]
    pub fn planar_distance(&self, other: &ScaledPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Absolute difference in days
    #[inline]
    pub fn day_gap(&self, other: &ScaledPoint) -> f64 {
        (self.day - other.day).abs()
    }
}

/// Produce the time-scaled working set for one configuration.
///
/// The input is only read; ordinals follow input order.
pub fn scale_points(points: &[Point], time_scale: f64, epoch: TimeEpoch) -> Result<Vec<ScaledPoint>> {
    if !time_scale.is_finite() || time_scale < 0.0 {
        return Err(Error::invalid("time_scale", time_scale, "must be finite and non-negative"));
    }
    Ok(points
        .iter()
        .enumerate()
        .map(|(i, p)| p.scale(i, time_scale, epoch))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_of_year_offset() {
        let p = Point::new("a", 0.0, 0.0, date(2009, 1, 1), 1.0);
        assert_eq!(p.day_offset(TimeEpoch::StartOfYear), 1);

        let p = Point::new("a", 0.0, 0.0, date(2009, 3, 1), 1.0);
        assert_eq!(p.day_offset(TimeEpoch::StartOfYear), 60);

        let p = Point::new("a", 0.0, 0.0, date(2009, 12, 31), 1.0);
        assert_eq!(p.day_offset(TimeEpoch::StartOfYear), 365);
    }

    #[test]
    fn test_fixed_epoch_offset() {
        let epoch = TimeEpoch::Date(date(2008, 12, 31));
        let p = Point::new("a", 0.0, 0.0, date(2009, 1, 1), 1.0);
        assert_eq!(p.day_offset(epoch), 2);

        let before = Point::new("a", 0.0, 0.0, date(2008, 12, 30), 1.0);
        assert_eq!(before.day_offset(epoch), 0);
    }

    #[test]
    fn test_scale() {
        let p = Point::new("s", -84.0, 33.0, date(2009, 1, 10), 12.5);
        let s = p.scale(4, 0.5, TimeEpoch::StartOfYear);
        assert_eq!(s.ordinal, 4);
        assert_relative_eq!(s.x, -84.0);
        assert_relative_eq!(s.y, 33.0);
        assert_relative_eq!(s.t, 5.0);
        assert_relative_eq!(s.day, 10.0);
        assert_relative_eq!(s.value, 12.5);
    }

    #[test]
    fn test_from_ymd_rejects_bad_date() {
        assert!(Point::from_ymd("x", 2009, 2, 30, 0.0, 0.0, 1.0).is_err());
        assert!(Point::from_ymd("x", 2009, 2, 28, 0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_distances() {
        let a = ScaledPoint { ordinal: 0, x: 0.0, y: 0.0, t: 0.0, day: 1.0, value: 1.0 };
        let b = ScaledPoint { ordinal: 1, x: 3.0, y: 4.0, t: 12.0, day: 25.0, value: 1.0 };
        assert_relative_eq!(a.distance(&b), 13.0);
        assert_relative_eq!(a.planar_distance(&b), 5.0);
        assert_relative_eq!(a.day_gap(&b), 24.0);
        assert_relative_eq!(b.coord(2), 12.0);
    }

    #[test]
    fn test_scale_points_leaves_input_untouched() {
        let pts = vec![
            Point::new("a", 1.0, 2.0, date(2009, 1, 2), 3.0),
            Point::new("b", 4.0, 5.0, date(2009, 1, 3), 6.0),
        ];
        let copy = pts.clone();
        let a = scale_points(&pts, 1.0, TimeEpoch::StartOfYear).unwrap();
        let b = scale_points(&pts, 2.0, TimeEpoch::StartOfYear).unwrap();
        assert_eq!(pts, copy);
        assert_relative_eq!(a[1].t, 3.0);
        assert_relative_eq!(b[1].t, 6.0);
        assert_eq!(b[1].ordinal, 1);
    }

    #[test]
    fn test_scale_points_rejects_bad_scale() {
        assert!(scale_points(&[], f64::NAN, TimeEpoch::StartOfYear).is_err());
        assert!(scale_points(&[], -1.0, TimeEpoch::StartOfYear).is_err());
    }
}
