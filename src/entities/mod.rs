//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod attendance;
pub mod employee;
pub mod folio;
pub mod folio_line_item;
pub mod overtime;
pub mod payment;
pub mod property_service;
pub mod rate_plan;
pub mod reservation;
pub mod restaurant_table;
pub mod room;
pub mod sea_orm_active_enums;
pub mod table_booking;
pub mod working_shift;

// Re-export specific types to avoid conflicts
pub use attendance::{Entity as Attendance, Model as AttendanceModel};
pub use employee::{Entity as Employee, Model as EmployeeModel};
pub use folio::{Entity as Folio, Model as FolioModel};
pub use folio_line_item::{Entity as FolioLineItem, Model as FolioLineItemModel};
pub use overtime::{Entity as Overtime, Model as OvertimeModel};
pub use payment::{Entity as Payment, Model as PaymentModel};
pub use property_service::{Entity as PropertyService, Model as PropertyServiceModel};
pub use rate_plan::{Entity as RatePlan, Model as RatePlanModel};
pub use reservation::{Entity as Reservation, Model as ReservationModel};
pub use restaurant_table::{Entity as RestaurantTable, Model as RestaurantTableModel};
pub use room::{Entity as Room, Model as RoomModel};
pub use sea_orm_active_enums::{
    BookingChannel, HousekeepingStatus, LineItemType, OperationalStatus, PaymentMethod,
    PaymentStatus, ReservationStatus, TableBookingStatus,
};
pub use table_booking::{Entity as TableBooking, Model as TableBookingModel};
pub use working_shift::{Entity as WorkingShift, Model as WorkingShiftModel};
