use crate::models::{
    Admin, AdminOrder, Fish, FishSummary, FishUpdate, NewFish, NewOrder, NewUser, Order,
    OrderBuyer, OrderItem, OrderStatus, ShippingAddress, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, query_builder::QueryBuilder, types::Json};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, allowing the
/// handlers to interact with the data layer without knowing the concrete
/// implementation (Postgres in production, mocks in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Admins ---
    async fn find_admin_by_email(&self, email: &str) -> Option<Admin>;
    /// Idempotent bootstrap: creates the default admin if (and only if) no
    /// admin with that email exists. Never deletes or overwrites.
    async fn ensure_default_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), sqlx::Error>;

    // --- Fish Catalog ---
    /// Listing with optional case-insensitive name filter, newest-first.
    /// `limit` bounds the dashboard view; None returns everything.
    async fn list_fish(&self, search: Option<String>, limit: Option<i64>) -> Vec<Fish>;
    async fn get_fish(&self, id: Uuid) -> Option<Fish>;
    async fn create_fish(&self, fish: NewFish) -> Result<Fish, sqlx::Error>;
    /// Merges scalar fields; photo/video paths are replaced only when Some.
    async fn update_fish(&self, id: Uuid, update: FishUpdate) -> Option<Fish>;
    async fn delete_fish(&self, id: Uuid) -> bool;
    /// Application-level referential check for order items.
    async fn fish_exists(&self, id: Uuid) -> bool;

    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;
    /// Paged listing with case-insensitive name filter. Returns the page rows
    /// and the total matching count.
    async fn list_users(&self, page: i64, per_page: i64, search: Option<String>) -> (Vec<User>, i64);
    async fn set_user_active(&self, id: Uuid, is_active: bool) -> bool;
    /// The derived order-reference list surfaced on the profile projection.
    async fn user_order_ids(&self, user_id: Uuid) -> Vec<Uuid>;

    // --- Orders ---
    async fn create_order(&self, order: NewOrder) -> Result<Order, sqlx::Error>;
    /// Only the given user's orders, newest-first, items populated.
    async fn get_orders_for_user(&self, user_id: Uuid) -> Vec<Order>;
    /// All orders with buyer joined in, newest-first. Admin view.
    async fn list_orders(&self) -> Vec<AdminOrder>;
    async fn get_order(&self, id: Uuid) -> Option<AdminOrder>;
    /// Free-form status mutation with a refreshed update timestamp. No
    /// transition validation by design.
    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Option<AdminOrder>;
    async fn count_pending_orders(&self) -> i64;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by Postgres.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads and groups the item lines (with the live fish populated) for a
    /// set of orders in one round trip.
    async fn load_items(
        &self,
        order_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<OrderItem>>, sqlx::Error> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT i.order_id, i.fish_id, i.name, i.photo, i.price, i.quantity,
                   f.id AS live_id, f.name AS live_name, f.photo AS live_photo,
                   f.price AS live_price, f.type AS live_type
            FROM order_items i
            LEFT JOIN fish f ON f.id = i.fish_id
            WHERE i.order_id = ANY($1)
            ORDER BY i.id
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

// --- Internal Row Mappings ---

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, payment_method, \
     shipping_address, razorpay_order_id, razorpay_payment_id, razorpay_signature, \
     payment_status, order_number, created_at, updated_at";

/// Raw `orders` row before its items are attached.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total_amount: f64,
    status: OrderStatus,
    payment_method: crate::models::PaymentMethod,
    shipping_address: Json<ShippingAddress>,
    razorpay_order_id: Option<String>,
    razorpay_payment_id: Option<String>,
    razorpay_signature: Option<String>,
    payment_status: crate::models::PaymentStatus,
    order_number: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            items,
            total_amount: self.total_amount,
            status: self.status,
            payment_method: self.payment_method,
            shipping_address: self.shipping_address.0,
            razorpay_order_id: self.razorpay_order_id,
            razorpay_payment_id: self.razorpay_payment_id,
            razorpay_signature: self.razorpay_signature,
            payment_status: self.payment_status,
            order_number: self.order_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// An `orders` row joined with its buyer for the admin views.
#[derive(sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    buyer_id: Option<Uuid>,
    buyer_name: Option<String>,
    buyer_email: Option<String>,
    buyer_phone: Option<String>,
    buyer_address: Option<String>,
}

impl AdminOrderRow {
    fn into_admin_order(self, items: Vec<OrderItem>) -> AdminOrder {
        let buyer = self.buyer_id.map(|id| OrderBuyer {
            id,
            name: self.buyer_name.unwrap_or_default(),
            email: self.buyer_email.unwrap_or_default(),
            phone: self.buyer_phone.unwrap_or_default(),
            address: self.buyer_address.unwrap_or_default(),
        });
        AdminOrder {
            order: self.order.into_order(items),
            buyer,
        }
    }
}

/// An `order_items` row with the live fish LEFT JOINed in.
#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: Uuid,
    fish_id: Uuid,
    name: String,
    photo: String,
    price: f64,
    quantity: i32,
    live_id: Option<Uuid>,
    live_name: Option<String>,
    live_photo: Option<String>,
    live_price: Option<f64>,
    live_type: Option<String>,
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        let fish = row.live_id.map(|id| FishSummary {
            id,
            name: row.live_name.unwrap_or_default(),
            photo: row.live_photo.unwrap_or_default(),
            price: row.live_price.unwrap_or_default(),
            fish_type: row.live_type.unwrap_or_default(),
        });
        OrderItem {
            fish_id: row.fish_id,
            name: row.name,
            photo: row.photo,
            price: row.price,
            quantity: row.quantity,
            fish,
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- ADMINS ---

    async fn find_admin_by_email(&self, email: &str) -> Option<Admin> {
        sqlx::query_as("SELECT id, name, email, password_hash FROM admins WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("find_admin_by_email error: {:?}", e);
                None
            })
    }

    async fn ensure_default_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO admins (id, name, email, password_hash) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- FISH CATALOG ---

    /// Implements the optional name filter with QueryBuilder for safe
    /// parameterization; results are newest-first.
    async fn list_fish(&self, search: Option<String>, limit: Option<i64>) -> Vec<Fish> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"SELECT id, name, photo, video, price, type, timestamp FROM fish"#,
        );

        if let Some(s) = search {
            let pattern = format!("%{}%", s);
            builder.push(" WHERE name ILIKE ");
            builder.push_bind(pattern);
        }

        builder.push(" ORDER BY timestamp DESC");

        if let Some(n) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(n);
        }

        match builder.build_query_as::<Fish>().fetch_all(&self.pool).await {
            Ok(fishes) => fishes,
            Err(e) => {
                tracing::error!("list_fish error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_fish(&self, id: Uuid) -> Option<Fish> {
        sqlx::query_as(
            "SELECT id, name, photo, video, price, type, timestamp FROM fish WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_fish error: {:?}", e);
            None
        })
    }

    async fn create_fish(&self, fish: NewFish) -> Result<Fish, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO fish (id, name, photo, video, price, type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, photo, video, price, type, timestamp
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fish.name)
        .bind(&fish.photo)
        .bind(&fish.video)
        .bind(fish.price)
        .bind(&fish.fish_type)
        .fetch_one(&self.pool)
        .await
    }

    /// Uses COALESCE so the stored photo/video paths survive requests that
    /// carried no new file.
    async fn update_fish(&self, id: Uuid, update: FishUpdate) -> Option<Fish> {
        sqlx::query_as(
            r#"
            UPDATE fish
            SET name = $2,
                price = $3,
                type = $4,
                photo = COALESCE($5, photo),
                video = COALESCE($6, video)
            WHERE id = $1
            RETURNING id, name, photo, video, price, type, timestamp
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.price)
        .bind(&update.fish_type)
        .bind(&update.photo)
        .bind(&update.video)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_fish error: {:?}", e);
            None
        })
    }

    async fn delete_fish(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM fish WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_fish error: {:?}", e);
                false
            }
        }
    }

    async fn fish_exists(&self, id: Uuid) -> bool {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM fish WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("fish_exists error: {:?}", e);
                false
            })
    }

    // --- USERS ---

    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as(
            "SELECT id, name, email, password_hash, phone, address, role, is_active, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user error: {:?}", e);
            None
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as(
            "SELECT id, name, email, password_hash, phone, address, role, is_active, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_user_by_email error: {:?}", e);
            None
        })
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, password_hash, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, phone, address, role, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_users(
        &self,
        page: i64,
        per_page: i64,
        search: Option<String>,
    ) -> (Vec<User>, i64) {
        let pattern = search.map(|s| format!("%{}%", s));

        let mut count_builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users");
        if let Some(p) = &pattern {
            count_builder.push(" WHERE name ILIKE ");
            count_builder.push_bind(p.clone());
        }
        let total = match count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                tracing::error!("list_users count error: {:?}", e);
                0
            }
        };

        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT id, name, email, password_hash, phone, address, role, is_active, created_at \
             FROM users",
        );
        if let Some(p) = &pattern {
            builder.push(" WHERE name ILIKE ");
            builder.push_bind(p.clone());
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(per_page);
        builder.push(" OFFSET ");
        builder.push_bind((page - 1).max(0) * per_page);

        let users = match builder.build_query_as::<User>().fetch_all(&self.pool).await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            }
        };

        (users, total)
    }

    async fn set_user_active(&self, id: Uuid, is_active: bool) -> bool {
        match sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("set_user_active error: {:?}", e);
                false
            }
        }
    }

    async fn user_order_ids(&self, user_id: Uuid) -> Vec<Uuid> {
        sqlx::query_scalar("SELECT id FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("user_order_ids error: {:?}", e);
                vec![]
            })
    }

    // --- ORDERS ---

    /// Order and item rows are written in one transaction: the save either
    /// fully succeeds or the request fails as a whole.
    async fn create_order(&self, order: NewOrder) -> Result<Order, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO orders (id, user_id, total_amount, status, payment_method,
                                shipping_address, razorpay_order_id, razorpay_payment_id,
                                razorpay_signature, payment_status, order_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(order.user_id)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.payment_method)
        .bind(Json(order.shipping_address.clone()))
        .bind(&order.razorpay_order_id)
        .bind(&order.razorpay_payment_id)
        .bind(&order.razorpay_signature)
        .bind(order.payment_status)
        .bind(&order.order_number)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, fish_id, name, photo, price, quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(row.id)
            .bind(item.fish_id)
            .bind(&item.name)
            .bind(&item.photo)
            .bind(item.price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let items = order
            .items
            .iter()
            .map(|item| OrderItem {
                fish_id: item.fish_id,
                name: item.name.clone(),
                photo: item.photo.clone(),
                price: item.price,
                quantity: item.quantity,
                fish: None,
            })
            .collect();

        Ok(row.into_order(items))
    }

    async fn get_orders_for_user(&self, user_id: Uuid) -> Vec<Order> {
        let rows: Vec<OrderRow> = match sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("get_orders_for_user error: {:?}", e);
                return vec![];
            }
        };

        let mut items = match self.load_items(rows.iter().map(|r| r.id).collect()).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("get_orders_for_user items error: {:?}", e);
                return vec![];
            }
        };

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }

    async fn list_orders(&self) -> Vec<AdminOrder> {
        let rows: Vec<AdminOrderRow> = match sqlx::query_as(
            r#"
            SELECT o.id, o.user_id, o.total_amount, o.status, o.payment_method,
                   o.shipping_address, o.razorpay_order_id, o.razorpay_payment_id,
                   o.razorpay_signature, o.payment_status, o.order_number,
                   o.created_at, o.updated_at,
                   u.id AS buyer_id, u.name AS buyer_name, u.email AS buyer_email,
                   u.phone AS buyer_phone, u.address AS buyer_address
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("list_orders error: {:?}", e);
                return vec![];
            }
        };

        let mut items = match self
            .load_items(rows.iter().map(|r| r.order.id).collect())
            .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("list_orders items error: {:?}", e);
                return vec![];
            }
        };

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.order.id).unwrap_or_default();
                row.into_admin_order(order_items)
            })
            .collect()
    }

    async fn get_order(&self, id: Uuid) -> Option<AdminOrder> {
        let row: AdminOrderRow = sqlx::query_as(
            r#"
            SELECT o.id, o.user_id, o.total_amount, o.status, o.payment_method,
                   o.shipping_address, o.razorpay_order_id, o.razorpay_payment_id,
                   o.razorpay_signature, o.payment_status, o.order_number,
                   o.created_at, o.updated_at,
                   u.id AS buyer_id, u.name AS buyer_name, u.email AS buyer_email,
                   u.phone AS buyer_phone, u.address AS buyer_address
            FROM orders o
            LEFT JOIN users u ON u.id = o.user_id
            WHERE o.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_order error: {:?}", e);
            None
        })?;

        let items = match self.load_items(vec![row.order.id]).await {
            Ok(mut items) => items.remove(&row.order.id).unwrap_or_default(),
            Err(e) => {
                tracing::error!("get_order items error: {:?}", e);
                vec![]
            }
        };

        Some(row.into_admin_order(items))
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> Option<AdminOrder> {
        let updated = match sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("update_order_status error: {:?}", e);
                false
            }
        };

        if !updated {
            return None;
        }
        self.get_order(id).await
    }

    async fn count_pending_orders(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
            .bind(OrderStatus::Pending)
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("count_pending_orders error: {:?}", e);
                0
            })
    }
}
