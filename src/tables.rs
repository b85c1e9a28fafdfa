//! The song-play star schema.
//!
//! Two staging tables receive the raw JSON logs; five derived tables are
//! populated from them.
//!
//! Types: <https://docs.aws.amazon.com/redshift/latest/dg/c_Supported_data_types.html>

use crate::column::Column;
use crate::config::S3Config;
use crate::registry::TableSpec;

#[rustfmt::skip]
pub const STAGING_EVENTS: &str = "staging_events";
#[rustfmt::skip]
pub const STAGING_SONGS:  &str = "staging_songs";
#[rustfmt::skip]
pub const USERS:          &str = "users";
#[rustfmt::skip]
pub const SONGS:          &str = "songs";
#[rustfmt::skip]
pub const ARTISTS:        &str = "artists";
#[rustfmt::skip]
pub const TIME:           &str = "time";
#[rustfmt::skip]
pub const SONGPLAYS:      &str = "songplays";

/// Latest known attributes of every user, by event timestamp.
pub const USERS_QUERY: &str = "\
SELECT
  e.userId AS user_id,
  e.firstName AS first_name,
  e.lastName AS last_name,
  e.gender AS gender,
  e.level AS level
FROM staging_events AS e
INNER JOIN (SELECT userId AS user_id, MAX(ts) AS latest_ts
            FROM staging_events
            WHERE userId IS NOT NULL
            GROUP BY 1) AS last_update
            ON last_update.user_id = e.userId
            AND last_update.latest_ts = e.ts";

/// One row per song; conflicting attributes resolve to their maximum.
pub const SONGS_QUERY: &str = "\
SELECT
  song_id,
  MAX(title) AS title,
  MAX(artist_id) AS artist_id,
  MAX(year) AS year,
  MAX(duration) AS duration
FROM staging_songs
WHERE song_id IS NOT NULL
GROUP BY song_id";

/// One row per artist; conflicting attributes resolve to a single value.
pub const ARTISTS_QUERY: &str = "\
SELECT
  artist_id,
  MIN(artist_name) AS name,
  MAX(artist_location) AS location,
  MAX(artist_latitude) AS latitude,
  MAX(artist_longitude) AS longitude
FROM staging_songs
WHERE artist_id IS NOT NULL
GROUP BY artist_id";

/// Distinct play timestamps split into date parts. `ts` is epoch millis.
pub const TIME_QUERY: &str = "\
SELECT
  e.t AS start_time,
  EXTRACT(HOUR FROM e.t) AS hour,
  EXTRACT(DAY FROM e.t) AS day,
  EXTRACT(WEEK FROM e.t) AS week,
  EXTRACT(MONTH FROM e.t) AS month,
  EXTRACT(YEAR FROM e.t) AS year,
  EXTRACT(WEEKDAY FROM e.t) AS weekday
FROM (SELECT DISTINCT TIMESTAMP 'EPOCH' + ts/1000 * INTERVAL '1 SECOND' AS t
      FROM staging_events
      WHERE ts IS NOT NULL AND page = 'NextSong') AS e";

/// Song plays. Events carry no song or artist id, so they are matched to
/// songs by title and artist name.
pub const SONGPLAYS_QUERY: &str = "\
SELECT
  TIMESTAMP 'EPOCH' + e.ts/1000 * INTERVAL '1 SECOND' AS start_time,
  e.userId AS user_id,
  e.level,
  s.song_id,
  s.artist_id,
  e.sessionId AS session_id,
  e.location,
  e.userAgent AS user_agent
FROM staging_events AS e
INNER JOIN staging_songs AS s
   ON (s.title = e.song AND s.artist_name = e.artist)
WHERE e.page = 'NextSong'
  AND e.userId IS NOT NULL
  AND e.ts IS NOT NULL";

/// All tables in creation order, staging first.
pub fn sparkify(s3: &S3Config) -> Vec<TableSpec> {
    vec![
        staging_events(s3),
        staging_songs(s3),
        users(),
        songs(),
        artists(),
        time(),
        songplays(),
    ]
}

fn staging_events(s3: &S3Config) -> TableSpec {
    TableSpec::staging(
        STAGING_EVENTS,
        vec![
            Column::new("artist", "VARCHAR"),
            Column::new("auth", "VARCHAR"),
            Column::new("firstName", "VARCHAR"),
            Column::new("gender", "CHAR(1)"), // M, F
            Column::new("itemInSession", "SMALLINT"),
            Column::new("lastName", "VARCHAR"),
            Column::new("length", "DOUBLE PRECISION"),
            Column::new("level", "CHAR(4)"), // free, paid
            Column::new("location", "VARCHAR"),
            Column::new("method", "VARCHAR(6)"),
            Column::new("page", "VARCHAR"),
            Column::new("registration", "INT8"),
            Column::new("sessionId", "INT4"),
            Column::new("song", "VARCHAR"),
            Column::new("status", "INT2"),
            Column::new("ts", "INT8"),
            Column::new("userAgent", "VARCHAR"),
            Column::new("userId", "INT4"), // arrives as text
        ],
        s3.log_data.clone(),
        Some(s3.log_jsonpath.clone()),
    )
}

fn staging_songs(s3: &S3Config) -> TableSpec {
    TableSpec::staging(
        STAGING_SONGS,
        vec![
            Column::new("num_songs", "INT2"),
            Column::new("artist_id", "VARCHAR(64)"),
            Column::new("artist_latitude", "DOUBLE PRECISION"),
            Column::new("artist_longitude", "DOUBLE PRECISION"),
            Column::new("artist_location", "VARCHAR"),
            Column::new("artist_name", "VARCHAR"),
            Column::new("song_id", "VARCHAR(64)"),
            Column::new("title", "VARCHAR"),
            Column::new("duration", "DOUBLE PRECISION"),
            Column::new("year", "INT2"),
        ],
        s3.song_data.clone(),
        None,
    )
}

fn users() -> TableSpec {
    TableSpec::derived(
        USERS,
        vec![
            Column::new("user_id", "INT4"),
            Column::new("first_name", "VARCHAR"),
            Column::new("last_name", "VARCHAR"),
            Column::new("gender", "CHAR(1)"),
            Column::new("level", "CHAR(4)"),
        ],
        USERS_QUERY,
    )
    .primary_key(["user_id"])
}

fn songs() -> TableSpec {
    TableSpec::derived(
        SONGS,
        vec![
            Column::new("song_id", "VARCHAR(64)"),
            Column::new("title", "VARCHAR"),
            Column::new("artist_id", "VARCHAR(64)"),
            Column::new("year", "INT2"),
            Column::new("duration", "DOUBLE PRECISION"),
        ],
        SONGS_QUERY,
    )
    .primary_key(["song_id"])
}

fn artists() -> TableSpec {
    TableSpec::derived(
        ARTISTS,
        vec![
            Column::new("artist_id", "VARCHAR(64)"),
            Column::new("name", "VARCHAR"),
            Column::new("location", "VARCHAR"),
            Column::new("latitude", "DOUBLE PRECISION"),
            Column::new("longitude", "DOUBLE PRECISION"),
        ],
        ARTISTS_QUERY,
    )
    .primary_key(["artist_id"])
}

fn time() -> TableSpec {
    TableSpec::derived(
        TIME,
        vec![
            Column::new("start_time", "TIMESTAMP"),
            Column::new("hour", "INT2").with_extra("NOT NULL"),
            Column::new("day", "INT2").with_extra("NOT NULL"),
            Column::new("week", "INT2").with_extra("NOT NULL"),
            Column::new("month", "INT2").with_extra("NOT NULL"),
            Column::new("year", "INT2").with_extra("NOT NULL"),
            Column::new("weekday", "INT2").with_extra("NOT NULL"),
        ],
        TIME_QUERY,
    )
    .primary_key(["start_time"])
}

fn songplays() -> TableSpec {
    TableSpec::derived(
        SONGPLAYS,
        vec![
            Column::new("songplay_id", "INT4").with_extra("IDENTITY(0, 1)"),
            Column::new("start_time", "TIMESTAMP").with_extra("NOT NULL"),
            Column::new("user_id", "INT4").with_extra("NOT NULL"),
            Column::new("level", "CHAR(4)"),
            Column::new("song_id", "VARCHAR(64)"),
            Column::new("artist_id", "VARCHAR(64)"),
            Column::new("session_id", "INT4"),
            Column::new("location", "VARCHAR"),
            Column::new("user_agent", "VARCHAR"),
        ],
        SONGPLAYS_QUERY,
    )
    .primary_key(["songplay_id"])
}
