use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use tally_settlement::{SettlementPlanner, SettlementPolicy};

use crate::app::{dto, errors};
use crate::context::RequestContext;

/// Expenses in, balances + payments out.
pub async fn settle_group(
    Extension(policy): Extension<SettlementPolicy>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<dto::SettleGroupRequest>,
) -> axum::response::Response {
    let plan = match tally_settlement::settle_group_with(body.members, &body.expenses, &policy) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::info!(request_id = %ctx.request_id(), error = %e, "settlement rejected");
            return errors::domain_error_to_response(e);
        }
    };

    let response = dto::SettleGroupResponse {
        balances: dto::balances_to_entries(&plan.balances),
        settlements: plan.settlements.iter().map(dto::settlement_to_dto).collect(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Balances in, payments out.
pub async fn plan_settlements(
    Extension(policy): Extension<SettlementPolicy>,
    Json(body): Json<dto::PlanRequest>,
) -> axum::response::Response {
    let balances = match dto::entries_to_balances(body.balances) {
        Ok(b) => b,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match SettlementPlanner::new(policy).plan(&balances) {
        Ok(settlements) => (
            StatusCode::OK,
            Json(dto::PlanResponse {
                settlements: settlements.iter().map(dto::settlement_to_dto).collect(),
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
