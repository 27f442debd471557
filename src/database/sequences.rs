//! Counters behind the human-readable record ids.
//!
//! Every clinic draws from the same counter per record kind, so ids are
//! unique and increasing across the whole installation.

use diesel::prelude::*;

use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sequence {
    Appointment,
    Department,
    Doctor,
    WalkIn,
}

impl Sequence {
    fn name(self) -> &'static str {
        match self {
            Sequence::Appointment => "appointments",
            Sequence::Department => "departments",
            Sequence::Doctor => "doctors",
            Sequence::WalkIn => "walk_ins",
        }
    }

    pub fn prefix(self) -> char {
        match self {
            Sequence::Appointment => 'A',
            Sequence::Department => 'D',
            Sequence::Doctor => 'R',
            Sequence::WalkIn => 'W',
        }
    }
}

/// `A` + 7 → `A0007`. Values past 9999 keep all their digits.
pub fn format_display_id(prefix: char, value: i64) -> String {
    format!("{}{:04}", prefix, value)
}

/// Bumps the counter and returns the new value. Must run inside the
/// caller's write transaction so the id and the row commit together.
pub fn next_value(conn: &mut SqliteConnection, sequence: Sequence) -> Result<i64, ApiError> {
    use crate::schema::id_sequences;

    let updated = diesel::update(id_sequences::table.find(sequence.name()))
        .set(id_sequences::value.eq(id_sequences::value + 1i64))
        .execute(conn)?;
    if updated != 1 {
        return Err(anyhow::anyhow!("sequence '{}' is missing", sequence.name()).into());
    }

    let value = id_sequences::table
        .find(sequence.name())
        .select(id_sequences::value)
        .get_result::<i64>(conn)?;
    Ok(value)
}

pub fn next_display_id(
    conn: &mut SqliteConnection,
    sequence: Sequence,
) -> Result<String, ApiError> {
    let value = next_value(conn, sequence)?;
    Ok(format_display_id(sequence.prefix(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_four_digits() {
        assert_eq!(format_display_id('A', 7), "A0007");
        assert_eq!(format_display_id('W', 1234), "W1234");
    }

    #[test]
    fn wide_values_are_not_truncated() {
        assert_eq!(format_display_id('A', 12345), "A12345");
    }

    #[test]
    fn counters_increase_per_sequence() {
        let pool = crate::database::build_pool(":memory:").unwrap();
        crate::database::run_migrations(&pool).unwrap();
        let mut conn = pool.get().unwrap();

        assert_eq!(next_display_id(&mut conn, Sequence::Appointment).unwrap(), "A0001");
        assert_eq!(next_display_id(&mut conn, Sequence::Appointment).unwrap(), "A0002");
        assert_eq!(next_display_id(&mut conn, Sequence::WalkIn).unwrap(), "W0001");
        assert_eq!(next_display_id(&mut conn, Sequence::Doctor).unwrap(), "R0001");
    }
}
