//! SQL schema for the Matchday SQLite store.
//!
//! Executed once at connection startup. The shape is fixed; `PRAGMA
//! user_version` records it so a future change can be detected.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// Timestamps are fixed-width RFC 3339 strings in UTC (see
/// `encode::encode_dt`), so string comparison orders them chronologically.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS periods (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL,
    start_at  TEXT    NOT NULL,
    end_at    TEXT,                        -- NULL while active
    is_active INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
    CHECK (end_at IS NULL OR end_at >= start_at),
    CHECK (is_active = 0 OR end_at IS NULL)
);

-- At most one active period.
CREATE UNIQUE INDEX IF NOT EXISTS periods_single_active
    ON periods(is_active) WHERE is_active = 1;

CREATE INDEX IF NOT EXISTS periods_start_idx ON periods(start_at);

-- Exclusion constraint: [start_at, end_at) windows never overlap. An open
-- window (end_at NULL) extends to the end of time.
CREATE TRIGGER IF NOT EXISTS periods_no_overlap
BEFORE INSERT ON periods
WHEN EXISTS (
    SELECT 1 FROM periods p
    WHERE NEW.start_at < COALESCE(p.end_at, '9999-12-31T23:59:59.999999Z')
      AND p.start_at   < COALESCE(NEW.end_at, '9999-12-31T23:59:59.999999Z')
)
BEGIN
    SELECT RAISE(ABORT, 'period overlaps an existing period');
END;

CREATE TABLE IF NOT EXISTS teams (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL,
    period_id INTEGER NOT NULL REFERENCES periods(id) ON DELETE CASCADE,
    UNIQUE (period_id, name)
);

CREATE TABLE IF NOT EXISTS players (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT    NOT NULL,
    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    goals   INTEGER NOT NULL DEFAULT 0 CHECK (goals   >= 0),
    assists INTEGER NOT NULL DEFAULT 0 CHECK (assists >= 0),
    UNIQUE (team_id, name)
);

-- Matches are never updated once written.
CREATE TABLE IF NOT EXISTS matches (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    team1_id  INTEGER NOT NULL REFERENCES teams(id)   ON DELETE CASCADE,
    team2_id  INTEGER NOT NULL REFERENCES teams(id)   ON DELETE CASCADE,
    score1    INTEGER NOT NULL CHECK (score1 >= 0),
    score2    INTEGER NOT NULL CHECK (score2 >= 0),
    played_at TEXT    NOT NULL,
    period_id INTEGER NOT NULL REFERENCES periods(id) ON DELETE CASCADE,
    CHECK (team1_id != team2_id)
);

CREATE INDEX IF NOT EXISTS matches_period_idx ON matches(period_id, played_at);
CREATE INDEX IF NOT EXISTS teams_period_idx   ON teams(period_id);

PRAGMA user_version = 1;
";
