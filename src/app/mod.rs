// Application layer - Use case interactors

pub mod container;
pub mod crop_interactor;
pub mod mirror_interactor;
pub mod pipeline_interactor;
pub mod roi_interactor;
pub mod verify_interactor;

// Re-export interactors
pub use crop_interactor::CropInteractor;
pub use mirror_interactor::MirrorInteractor;
pub use pipeline_interactor::PipelineInteractor;
pub use roi_interactor::RoiInteractor;
pub use verify_interactor::VerifyInteractor;
