use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, VendorProfile},
        cart::{AddToCartRequest, CartList},
        orders::{
            CreateOrderRequest, DeclineOrderRequest, DeliveryCharge, EnrichedOrder,
            EnrichedOrderList, OrderList, PaymentWebhookRequest, VendorDecisionRequest,
        },
        packages::{CreatePackageRequest, PackageList, UpdatePackageRequest},
    },
    models::{CartItem, Order, Package, User},
    pricing::FeeBreakdown,
    response::{ApiResponse, Meta},
    routes::{auth, cart, health, orders, packages, params, payments},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        cart::list_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        packages::list_packages,
        packages::create_package,
        packages::get_package,
        packages::update_package,
        packages::delete_package,
        orders::list_orders,
        orders::create_order,
        orders::list_my_orders,
        orders::get_order,
        orders::vendor_decision,
        orders::decline_order,
        orders::start_delivery,
        orders::get_delivery_charge,
        payments::payment_webhook
    ),
    components(
        schemas(
            User,
            Package,
            CartItem,
            Order,
            FeeBreakdown,
            EnrichedOrder,
            RegisterRequest,
            VendorProfile,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            CreatePackageRequest,
            UpdatePackageRequest,
            CreateOrderRequest,
            VendorDecisionRequest,
            DeclineOrderRequest,
            PaymentWebhookRequest,
            DeliveryCharge,
            CartList,
            PackageList,
            OrderList,
            EnrichedOrderList,
            params::Pagination,
            params::OrderListQuery,
            params::PackageListQuery,
            Meta,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<EnrichedOrderList>,
            ApiResponse<Package>,
            ApiResponse<PackageList>,
            ApiResponse<CartList>,
            ApiResponse<DeliveryCharge>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Packages", description = "Vendor package endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order lifecycle endpoints"),
        (name = "Payments", description = "Payment webhook endpoint"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
