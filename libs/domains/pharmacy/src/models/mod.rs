pub mod medicine;
pub mod reports;
pub mod stock_lot;
pub mod supplier;

pub use medicine::{
    CreateMedicine, Medicine, MedicineChanges, MedicineCount, MedicineFilter, MedicineResponse, UpdateMedicine,
};
pub use reports::{
    AddressQuery, LotDetail, MedicineSummary, MedicinesBySupplierRow, NameQuery, ReportResult,
    StockByMedicineRow, SupplierAddressRow, SupplierAveragePriceRow, SupplierMedicineCountRow,
    SupplierPriceExtremeRow,
};
pub use stock_lot::{
    CreateStockLot, ExpiryWindow, StockLot, StockLotCount, StockLotFilter, StockLotResponse,
    StockLotChanges, StockLotWithMedicine, UpdateStockLot,
};
pub use supplier::{
    CreateSupplier, Supplier, SupplierChanges, SupplierCount, SupplierFilter, SupplierResponse, UpdateSupplier,
};
