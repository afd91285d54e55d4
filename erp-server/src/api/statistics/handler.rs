//! Statistics handlers

use axum::extract::{Path, State};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::billing::{
    cashflow_year_totals, invoice_year_stats, CashflowYearTotals, InvoiceYearStats,
};
use crate::core::ServerState;
use crate::db::models::{DealStage, StatementTotals};
use crate::db::repository::{
    CashflowFilter, CashflowRepository, CustomerRepository, DealRepository, FinancialItemRepository,
    InvoiceFilter, InvoiceRepository, NotificationRepository,
};
use crate::utils::time::today;
use crate::utils::{ok, ApiResponse, AppResult};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub customers: usize,
    pub open_deals: usize,
    pub open_deals_value: Decimal,
    pub cashflow: CashflowYearTotals,
    pub open_notifications: usize,
}

/// GET /api/statistics/cashflow/{anno}
pub async fn cashflow_stats(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(anno): Path<i32>,
) -> AppResult<ApiResponse<CashflowYearTotals>> {
    let records = CashflowRepository::new(state.get_db())
        .find_all(
            &user.company,
            CashflowFilter {
                anno: Some(anno),
                ..Default::default()
            },
        )
        .await?;
    let invoices = InvoiceRepository::new(state.get_db())
        .find_all(&user.company, InvoiceFilter::default())
        .await?;
    Ok(ok(cashflow_year_totals(anno, &records, &invoices)))
}

/// GET /api/statistics/invoices/{anno}
pub async fn invoice_stats(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(anno): Path<i32>,
) -> AppResult<ApiResponse<InvoiceYearStats>> {
    let invoices = InvoiceRepository::new(state.get_db())
        .find_all(
            &user.company,
            InvoiceFilter {
                anno: Some(anno),
                ..Default::default()
            },
        )
        .await?;
    let cashflows = CashflowRepository::new(state.get_db())
        .find_all(&user.company, CashflowFilter::default())
        .await?;
    Ok(ok(invoice_year_stats(anno, &invoices, &cashflows)))
}

/// GET /api/statistics/financial-statement
pub async fn financial_statement(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<StatementTotals>> {
    let items = FinancialItemRepository::new(state.get_db())
        .find_all(&user.company, None)
        .await?;
    Ok(ok(StatementTotals::compute(&items)))
}

/// GET /api/statistics/dashboard
///
/// One-call summary for the landing page: CRM counters, current-year
/// cashflow and open notifications.
pub async fn dashboard(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Dashboard>> {
    let anno = today().year();

    let customers = CustomerRepository::new(state.get_db())
        .find_all(&user.company, None, None)
        .await?;
    let deals = DealRepository::new(state.get_db())
        .find_all(&user.company, None)
        .await?;
    let records = CashflowRepository::new(state.get_db())
        .find_all(
            &user.company,
            CashflowFilter {
                anno: Some(anno),
                ..Default::default()
            },
        )
        .await?;
    let invoices = InvoiceRepository::new(state.get_db())
        .find_all(&user.company, InvoiceFilter::default())
        .await?;
    let notifications = NotificationRepository::new(state.get_db())
        .list_open(&user.company)
        .await?;

    let open: Vec<_> = deals
        .iter()
        .filter(|d| !matches!(d.stage, DealStage::Vinto | DealStage::Perso))
        .collect();

    Ok(ok(Dashboard {
        customers: customers.len(),
        open_deals: open.len(),
        open_deals_value: open.iter().map(|d| d.value).sum(),
        cashflow: cashflow_year_totals(anno, &records, &invoices),
        open_notifications: notifications.len(),
    }))
}
