use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("Student code must not be empty")]
    InvalidStudentCode,

    #[error("Unit not found: {unit_id}")]
    UnitNotFound { unit_id: i32 },

    #[error("Semester not found: {semester_id}")]
    SemesterNotFound { semester_id: i32 },

    #[error("Student {student_code} is already enrolled in unit {unit_id} for semester {semester_id}")]
    DuplicateEnrollment {
        student_code: String,
        unit_id: i32,
        semester_id: i32,
    },

    #[error("All {seats} seats of unit {unit_id} for semester {semester_id} are taken")]
    CapacityExhausted {
        unit_id: i32,
        semester_id: i32,
        seats: u64,
    },

    /// The chosen seat or triple was taken between the read and the insert
    #[error("Enrollment seat conflict on unit {unit_id} for semester {semester_id}")]
    SeatConflict { unit_id: i32, semester_id: i32 },

    #[error("Enrollment gave up after {attempts} conflicting attempts")]
    Contention { attempts: u32 },
}
