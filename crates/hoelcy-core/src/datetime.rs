use std::sync::OnceLock;

use chrono::{
  DateTime,
  Datelike,
  FixedOffset,
  Local,
  NaiveDate,
  NaiveDateTime,
  SecondsFormat,
  TimeDelta,
  TimeZone,
  Timelike,
  Utc
};
use chrono_tz::Tz;

const TIMEZONE_ENV_VAR: &str =
  "HOELCY_TIMEZONE";

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 =
  2520;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 =
  86400;

const GAP_STEP_MINUTES: i64 = 15;
const MAX_GAP_STEPS: i64 = 96;

static PROJECT_TZ: OnceLock<Option<Tz>> =
  OnceLock::new();

/// Pins the zone used for calendar-day
/// comparisons. The environment variable
/// wins over the settings value; with
/// neither, the system local zone is
/// used. Only the first call has effect.
pub fn install_timezone(
  settings_value: Option<&str>
) {
  let _ = PROJECT_TZ.get_or_init(|| {
    resolve_timezone(settings_value)
  });
}

pub fn configured_timezone()
-> Option<&'static Tz> {
  PROJECT_TZ
    .get_or_init(|| {
      resolve_timezone(None)
    })
    .as_ref()
}

/// Current instant in the zone that
/// defines "today".
#[must_use]
pub fn project_now()
-> DateTime<FixedOffset> {
  match configured_timezone() {
    | Some(tz) => {
      Utc::now()
        .with_timezone(tz)
        .fixed_offset()
    }
    | None => {
      Local::now().fixed_offset()
    }
  }
}

fn resolve_timezone(
  settings_value: Option<&str>
) -> Option<Tz> {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) =
      parse_timezone(&raw, TIMEZONE_ENV_VAR)
  {
    return Some(tz);
  }

  settings_value.and_then(|raw| {
    parse_timezone(raw, "settings.toml")
  })
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "resolved timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::warn!(
        source,
        timezone = %trimmed,
        error = %err,
        "invalid timezone; using system local zone"
      );
      None
    }
  }
}

/// Parses the ISO-8601 shapes the
/// webhooks emit. Date-only and naive
/// values are read as wall-clock time in
/// `tz`.
pub fn parse_iso_in<Z: TimeZone>(
  raw: &str,
  tz: &Z
) -> Option<DateTime<Z>> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(trimmed)
  {
    return Some(dt.with_timezone(tz));
  }

  for fmt in [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M"
  ] {
    if let Ok(naive) =
      NaiveDateTime::parse_from_str(
        trimmed, fmt
      )
    {
      return resolve_local(tz, naive);
    }
  }

  NaiveDate::parse_from_str(
    trimmed, "%Y-%m-%d"
  )
  .ok()
  .and_then(|date| {
    date.and_hms_opt(0, 0, 0)
  })
  .and_then(|naive| {
    resolve_local(tz, naive)
  })
}

/// Reads a wall-clock time in `tz`. A
/// time skipped by a DST change moves
/// forward to the first one that exists.
fn resolve_local<Z: TimeZone>(
  tz: &Z,
  naive: NaiveDateTime
) -> Option<DateTime<Z>> {
  (0..=MAX_GAP_STEPS).find_map(|step| {
    let shift = TimeDelta::try_minutes(
      step * GAP_STEP_MINUTES
    )?;
    let shifted =
      naive.checked_add_signed(shift)?;
    tz.from_local_datetime(&shifted)
      .earliest()
  })
}

/// Instant used for ordering by
/// `createdAt`. Unparsable values sort as
/// the oldest possible instant.
#[must_use]
pub fn sort_instant(
  raw: &str
) -> DateTime<Utc> {
  parse_iso_in(raw, &Utc)
    .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn day_offset<Z: TimeZone>(
  date: &DateTime<Z>,
  now: &DateTime<Z>
) -> i64 {
  (date.date_naive() - now.date_naive())
    .num_days()
}

#[must_use]
pub fn format_relative_date(
  raw: &str
) -> String {
  format_relative_date_at(
    raw,
    &project_now()
  )
}

/// `Today`, `Tomorrow` and `Yesterday`
/// by calendar day, otherwise a distance
/// phrase such as `in 3 days` or `2 hours
/// ago`.
#[must_use]
pub fn format_relative_date_at<
  Z: TimeZone
>(
  raw: &str,
  now: &DateTime<Z>
) -> String {
  let Some(date) =
    parse_iso_in(raw, &now.timezone())
  else {
    tracing::debug!(
      input = raw,
      "unparsable date"
    );
    return "Invalid date".to_string();
  };

  match day_offset(&date, now) {
    | 0 => "Today".to_string(),
    | 1 => "Tomorrow".to_string(),
    | -1 => "Yesterday".to_string(),
    | _ => format_distance(&date, now)
  }
}

#[must_use]
pub fn is_overdue(raw: &str) -> bool {
  is_overdue_at(raw, &project_now())
}

/// Overdue means strictly in the past and
/// not today; anything due earlier today
/// is never overdue.
#[must_use]
pub fn is_overdue_at<Z: TimeZone>(
  raw: &str,
  now: &DateTime<Z>
) -> bool {
  parse_iso_in(raw, &now.timezone())
    .map(|date| {
      date < *now
        && day_offset(&date, now) != 0
    })
    .unwrap_or(false)
}

#[must_use]
pub fn is_due_today(raw: &str) -> bool {
  is_due_today_at(raw, &project_now())
}

#[must_use]
pub fn is_due_today_at<Z: TimeZone>(
  raw: &str,
  now: &DateTime<Z>
) -> bool {
  parse_iso_in(raw, &now.timezone())
    .map(|date| {
      day_offset(&date, now) == 0
    })
    .unwrap_or(false)
}

/// Serializes an instant the way the
/// webhooks expect it:
/// `2024-01-02T03:04:05.000Z`.
#[must_use]
pub fn format_date_for_api(
  dt: DateTime<Utc>
) -> String {
  dt.to_rfc3339_opts(
    SecondsFormat::Millis,
    true
  )
}

/// Reads a due date typed on the command
/// line: `today`, `tomorrow`, `+Nd`, a
/// calendar date or a full timestamp.
/// Day-only forms mean midnight in the
/// zone of `now`.
pub fn parse_due_input<Z: TimeZone>(
  raw: &str,
  now: &DateTime<Z>
) -> anyhow::Result<String> {
  let trimmed = raw.trim();
  let lowered = trimmed.to_lowercase();
  let offset_days = match lowered.as_str()
  {
    | "today" => Some(0),
    | "tomorrow" => Some(1),
    | other => {
      other
        .strip_prefix('+')
        .and_then(|rest| {
          rest.strip_suffix('d')
        })
        .and_then(|days| {
          days.parse::<i64>().ok()
        })
    }
  };

  let due = match offset_days {
    | Some(days) => {
      TimeDelta::try_days(days)
        .and_then(|delta| {
          now
            .date_naive()
            .checked_add_signed(delta)
        })
        .and_then(|day| {
          day.and_hms_opt(0, 0, 0)
        })
        .and_then(|naive| {
          resolve_local(
            &now.timezone(),
            naive
          )
        })
    }
    | None => {
      parse_iso_in(
        trimmed,
        &now.timezone()
      )
    }
  };

  due
    .map(|dt| {
      format_date_for_api(
        dt.with_timezone(&Utc)
      )
    })
    .ok_or_else(|| {
      anyhow::anyhow!(
        "invalid due date: {raw}"
      )
    })
}

fn format_distance<Z: TimeZone>(
  date: &DateTime<Z>,
  now: &DateTime<Z>
) -> String {
  let seconds = date
    .clone()
    .signed_duration_since(now.clone())
    .num_seconds();
  let future = seconds > 0;
  let minutes = (seconds.abs() as f64
    / 60.0)
    .round() as i64;

  let phrase = if minutes < 2 {
    if minutes == 0 {
      "less than a minute".to_string()
    } else {
      "1 minute".to_string()
    }
  } else if minutes < 45 {
    format!("{minutes} minutes")
  } else if minutes < 90 {
    "about 1 hour".to_string()
  } else if minutes < MINUTES_IN_DAY {
    let hours = (minutes as f64 / 60.0)
      .round() as i64;
    format!("about {hours} hours")
  } else if minutes
    < MINUTES_IN_ALMOST_TWO_DAYS
  {
    "1 day".to_string()
  } else if minutes < MINUTES_IN_MONTH {
    let days = (minutes as f64
      / MINUTES_IN_DAY as f64)
      .round() as i64;
    format!("{days} days")
  } else if minutes
    < MINUTES_IN_TWO_MONTHS
  {
    let months = (minutes as f64
      / MINUTES_IN_MONTH as f64)
      .round() as i64;
    plural("about", months, "month")
  } else {
    let (earlier, later) = if future {
      (now.naive_local(), date.naive_local())
    } else {
      (date.naive_local(), now.naive_local())
    };
    let months =
      whole_months_between(earlier, later);
    if months < 12 {
      let nearest = (minutes as f64
        / MINUTES_IN_MONTH as f64)
        .round() as i64;
      plural("", nearest.max(1), "month")
    } else {
      let years = months / 12;
      match months % 12 {
        | m if m < 3 => {
          plural("about", years, "year")
        }
        | m if m < 9 => {
          plural("over", years, "year")
        }
        | _ => {
          plural(
            "almost",
            years + 1,
            "year"
          )
        }
      }
    }
  };

  if future {
    format!("in {phrase}")
  } else {
    format!("{phrase} ago")
  }
}

fn plural(
  prefix: &str,
  count: i64,
  unit: &str
) -> String {
  let unit = if count == 1 {
    unit.to_string()
  } else {
    format!("{unit}s")
  };
  if prefix.is_empty() {
    format!("{count} {unit}")
  } else {
    format!("{prefix} {count} {unit}")
  }
}

fn whole_months_between(
  earlier: NaiveDateTime,
  later: NaiveDateTime
) -> i64 {
  let mut months = i64::from(
    later.year() - earlier.year()
  ) * 12
    + i64::from(later.month())
    - i64::from(earlier.month());

  let later_rest = (
    later.day(),
    later.num_seconds_from_midnight()
  );
  let earlier_rest = (
    earlier.day(),
    earlier.num_seconds_from_midnight()
  );
  if months > 0
    && later_rest < earlier_rest
  {
    months -= 1;
  }
  months
}
