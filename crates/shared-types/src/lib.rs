pub mod eligibility;
pub mod parcel;
pub mod program;
pub mod report;
pub mod scenario;

pub use eligibility::{CheckClass, EligibilityResult, EligibilityWarning, Exclusion, UnknownFlagPolicy};
pub use parcel::{IncomeCategory, ParcelContext, Tenure, SQFT_PER_ACRE};
pub use program::{ProgramKind, UnknownProgram};
pub use report::{AnalysisReport, ProgramOutcome, ProgramStatus, Recommendation};
pub use scenario::{DevelopmentScenario, SetbackSide};
