//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the records the engine reads (companies, units, orders,
//! locations) and the distance cache it writes.

pub mod company;
pub mod customer;
pub mod dump_site;
pub mod location;
pub mod location_distance;
pub mod order;
pub mod order_unit;
pub mod rental_line_item;
pub mod service_event;
pub mod service_line_item;
pub mod unit;
pub mod unit_type;

// Re-export specific types to avoid conflicts
pub use company::{Entity as Company, Model as CompanyModel};
pub use customer::{Entity as Customer, Model as CustomerModel};
pub use dump_site::{Entity as DumpSite, Model as DumpSiteModel};
pub use location::{Entity as Location, Model as LocationModel};
pub use location_distance::{Entity as LocationDistance, Model as LocationDistanceModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use order_unit::{Entity as OrderUnit, Model as OrderUnitModel};
pub use rental_line_item::{Entity as RentalLineItem, Model as RentalLineItemModel};
pub use service_event::{Entity as ServiceEvent, Model as ServiceEventModel};
pub use service_line_item::{Entity as ServiceLineItem, Model as ServiceLineItemModel};
pub use unit::{Entity as Unit, Model as UnitModel};
pub use unit_type::{Entity as UnitType, Model as UnitTypeModel};
