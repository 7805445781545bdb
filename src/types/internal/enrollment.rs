/// Request to enroll a student in a unit for a semester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub student_code: String,
    pub unit_id: i32,
    pub semester_id: i32,
}

impl EnrollmentRequest {
    pub fn new(student_code: impl Into<String>, unit_id: i32, semester_id: i32) -> Self {
        Self {
            student_code: student_code.into().trim().to_string(),
            unit_id,
            semester_id,
        }
    }
}

/// A free seat: the group and the slot index inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub group: String,
    pub slot: i32,
}

/// Seats taken in one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOccupancy {
    pub group: String,
    pub enrolled: u64,
    pub capacity: u32,
}

impl GroupOccupancy {
    pub fn is_full(&self) -> bool {
        self.enrolled >= u64::from(self.capacity)
    }
}

/// Lowest slot in `0..capacity` not present in `taken`.
///
/// `taken` must be sorted ascending, as `EnrollmentStore::taken_slots`
/// returns it. Returns `None` when the group already holds `capacity` or
/// more students, so a group never exceeds its capacity even if it was
/// lowered after students enrolled.
pub fn lowest_free_slot(taken: &[i32], capacity: u32) -> Option<i32> {
    if taken.len() as u64 >= u64::from(capacity) {
        return None;
    }
    let capacity = i32::try_from(capacity).unwrap_or(i32::MAX);
    let mut candidate = 0;
    for &slot in taken {
        if slot > candidate {
            break;
        }
        if slot == candidate {
            candidate += 1;
        }
    }
    (candidate < capacity).then_some(candidate)
}
