mod inventory;
pub use inventory::Inventory;

mod settings;
pub use settings::Settings;
