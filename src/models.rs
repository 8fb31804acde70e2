pub mod crm;
pub mod forms;
