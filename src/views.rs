//! Admin dashboard pages.
//!
//! The dashboard is a small, server-rendered HTML surface; pages are assembled
//! from plain strings behind a single escape helper rather than a template
//! engine. Every dynamic value passes through [`esc`] before interpolation.

use crate::models::{AdminOrder, Fish, FishForm, User};

const STYLE: &str = "
body { font-family: sans-serif; margin: 2rem auto; max-width: 64rem; color: #222; }
nav a { margin-right: 1rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }
form.stack label { display: block; margin-top: 0.8rem; }
ul.errors { color: #b00020; }
.muted { color: #666; }
img.thumb { max-height: 48px; }
";

/// HTML-escapes a dynamic value for element or attribute context.
pub fn esc(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{}</style></head><body>{}</body></html>",
        esc(title),
        STYLE,
        body
    )
}

fn admin_nav() -> &'static str {
    "<nav><a href=\"/home\">Dashboard</a><a href=\"/create_fish\">Add fish</a>\
     <a href=\"/retrieve_fish\">All fish</a><a href=\"/userlist\">Users</a>\
     <a href=\"/orders\">Orders</a><a href=\"/logout\">Logout</a></nav>"
}

/// The login entry point. `error` is the single generic message shown for any
/// failed attempt.
pub fn login_page(error: Option<&str>) -> String {
    let error_html = match error {
        Some(msg) => format!("<p class=\"errors\">{}</p>", esc(msg)),
        None => String::new(),
    };
    layout(
        "Admin Login",
        &format!(
            "<h1>Aquastore Admin</h1>{error_html}\
             <form class=\"stack\" method=\"post\" action=\"/\">\
             <label>Email <input type=\"email\" name=\"email\" required></label>\
             <label>Password <input type=\"password\" name=\"password\" required></label>\
             <p><button type=\"submit\">Login</button></p></form>"
        ),
    )
}

fn fish_rows(fishes: &[Fish], with_actions: bool) -> String {
    let mut rows = String::new();
    for fish in fishes {
        let actions = if with_actions {
            format!(
                "<td><a href=\"/update_fish/{id}\">Edit</a> \
                 <a href=\"/delete_fish/{id}\">Delete</a></td>",
                id = fish.id
            )
        } else {
            String::new()
        };
        rows.push_str(&format!(
            "<tr><td><img class=\"thumb\" src=\"{}\" alt=\"\"></td><td>{}</td>\
             <td>{}</td><td>{:.2}</td>{}</tr>",
            esc(&fish.photo),
            esc(&fish.name),
            esc(&fish.fish_type),
            fish.price,
            actions
        ));
    }
    rows
}

/// The dashboard: searchable fish listing plus the pending-order badge.
pub fn dashboard_page(fishes: &[Fish], search: &str, pending_orders: i64) -> String {
    layout(
        "Dashboard",
        &format!(
            "{nav}<h1>Dashboard</h1>\
             <p class=\"muted\">{pending_orders} pending order(s)</p>\
             <form method=\"get\" action=\"/home\">\
             <input type=\"text\" name=\"search\" value=\"{search}\" placeholder=\"Search fish\">\
             <button type=\"submit\">Search</button></form>\
             <table><tr><th></th><th>Name</th><th>Type</th><th>Price</th><th></th></tr>{rows}</table>",
            nav = admin_nav(),
            search = esc(search),
            rows = fish_rows(fishes, true),
        ),
    )
}

/// The full catalog listing.
pub fn retrieve_page(fishes: &[Fish]) -> String {
    layout(
        "All Fish",
        &format!(
            "{}<h1>All Fish</h1>\
             <table><tr><th></th><th>Name</th><th>Type</th><th>Price</th></tr>{}</table>",
            admin_nav(),
            fish_rows(fishes, false),
        ),
    )
}

fn field_errors(errors: &[(&'static str, String)]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut list = String::from("<ul class=\"errors\">");
    for (field, message) in errors {
        list.push_str(&format!("<li>{}: {}</li>", esc(field), esc(message)));
    }
    list.push_str("</ul>");
    list
}

fn fish_fields(name: &str, price: &str, fish_type: &str) -> String {
    format!(
        "<label>Name <input type=\"text\" name=\"name\" value=\"{}\"></label>\
         <label>Price <input type=\"text\" name=\"price\" value=\"{}\"></label>\
         <label>Type <input type=\"text\" name=\"type\" value=\"{}\"></label>\
         <label>Photo <input type=\"file\" name=\"photo\" accept=\"image/*\"></label>\
         <label>Video <input type=\"file\" name=\"video\" accept=\"video/*\"></label>",
        esc(name),
        esc(price),
        esc(fish_type),
    )
}

/// The creation form, re-rendered with field-level errors and the submitted
/// values on validation failure.
pub fn fish_create_page(form: &FishForm, errors: &[(&'static str, String)]) -> String {
    layout(
        "Add Fish",
        &format!(
            "{}<h1>Add Fish</h1>{}\
             <form class=\"stack\" method=\"post\" action=\"/create_fish\" enctype=\"multipart/form-data\">\
             {}<p><button type=\"submit\">Create</button></p></form>",
            admin_nav(),
            field_errors(errors),
            fish_fields(&form.name, &form.price, &form.fish_type),
        ),
    )
}

/// The edit form. Existing media is kept unless a new file is chosen.
pub fn fish_update_page(fish: &Fish, errors: &[(&'static str, String)]) -> String {
    layout(
        "Edit Fish",
        &format!(
            "{}<h1>Edit Fish</h1>{}\
             <p><img class=\"thumb\" src=\"{}\" alt=\"\"> current photo</p>\
             <form class=\"stack\" method=\"post\" action=\"/update_fish/{}\" enctype=\"multipart/form-data\">\
             {}<p><button type=\"submit\">Save</button></p></form>",
            admin_nav(),
            field_errors(errors),
            esc(&fish.photo),
            fish.id,
            fish_fields(&fish.name, &format!("{}", fish.price), &fish.fish_type),
        ),
    )
}

/// The deletion confirmation page.
pub fn fish_delete_page(fish: &Fish) -> String {
    layout(
        "Delete Fish",
        &format!(
            "{}<h1>Delete Fish</h1>\
             <p>Delete <strong>{}</strong> ({:.2})?</p>\
             <form method=\"post\" action=\"/delete_fish/{}\">\
             <button type=\"submit\">Delete</button> <a href=\"/home\">Cancel</a></form>",
            admin_nav(),
            esc(&fish.name),
            fish.price,
            fish.id,
        ),
    )
}

/// The paged user listing with block/unblock actions.
pub fn user_list_page(
    users: &[User],
    page: i64,
    total_pages: i64,
    total_users: i64,
    search: &str,
) -> String {
    let mut rows = String::new();
    for user in users {
        let action = if user.is_active {
            format!("<a href=\"/user/block/{}\">Block</a>", user.id)
        } else {
            format!("<a href=\"/user/unblock/{}\">Unblock</a>", user.id)
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            esc(&user.name),
            esc(&user.email),
            esc(&user.phone),
            if user.is_active { "active" } else { "blocked" },
            action
        ));
    }

    let mut pager = String::new();
    for p in 1..=total_pages.max(1) {
        if p == page {
            pager.push_str(&format!("<strong>{p}</strong> "));
        } else {
            pager.push_str(&format!(
                "<a href=\"/userlist?page={p}&search={}\">{p}</a> ",
                esc(search)
            ));
        }
    }

    layout(
        "Users",
        &format!(
            "{}<h1>Users ({total_users})</h1>\
             <form method=\"get\" action=\"/userlist\">\
             <input type=\"text\" name=\"search\" value=\"{}\" placeholder=\"Search users\">\
             <button type=\"submit\">Search</button></form>\
             <table><tr><th>Name</th><th>Email</th><th>Phone</th><th>Status</th><th></th></tr>{rows}</table>\
             <p>{pager}</p>",
            admin_nav(),
            esc(search),
        ),
    )
}

fn order_row(order: &AdminOrder) -> String {
    let buyer = order
        .buyer
        .as_ref()
        .map(|b| format!("{} &lt;{}&gt;", esc(&b.name), esc(&b.email)))
        .unwrap_or_else(|| "<span class=\"muted\">unknown</span>".to_string());
    format!(
        "<tr><td><a href=\"/orders/{}\">{}</a></td><td>{}</td><td>{:.2}</td>\
         <td>{:?}</td><td>{:?}</td></tr>",
        order.order.id,
        esc(&order.order.order_number),
        buyer,
        order.order.total_amount,
        order.order.status,
        order.order.payment_status,
    )
}

/// The order overview with response-time aggregates.
pub fn orders_page(orders: &[AdminOrder], total_revenue: f64, pending_count: usize) -> String {
    let rows: String = orders.iter().map(order_row).collect();
    layout(
        "Orders",
        &format!(
            "{}<h1>Orders</h1>\
             <p class=\"muted\">Total revenue: {total_revenue:.2} &middot; Pending: {pending_count}</p>\
             <table><tr><th>Order</th><th>Buyer</th><th>Total</th><th>Status</th><th>Payment</th></tr>{rows}</table>",
            admin_nav(),
        ),
    )
}

/// A single order with buyer, items and the status form.
pub fn order_detail_page(order: &AdminOrder) -> String {
    let buyer = order
        .buyer
        .as_ref()
        .map(|b| {
            format!(
                "<p>{} &lt;{}&gt;<br>{}<br>{}</p>",
                esc(&b.name),
                esc(&b.email),
                esc(&b.phone),
                esc(&b.address)
            )
        })
        .unwrap_or_else(|| "<p class=\"muted\">Buyer record missing</p>".to_string());

    let mut items = String::new();
    for item in &order.order.items {
        let live = item
            .fish
            .as_ref()
            .map(|f| esc(&f.name))
            .unwrap_or_else(|| "<span class=\"muted\">removed</span>".to_string());
        items.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
            esc(&item.name),
            item.quantity,
            item.price,
            live
        ));
    }

    let mut options = String::new();
    for status in ["pending", "confirmed", "shipped", "delivered", "cancelled"] {
        options.push_str(&format!("<option value=\"{status}\">{status}</option>"));
    }

    layout(
        "Order Details",
        &format!(
            "{}<h1>Order {}</h1>{buyer}\
             <table><tr><th>Item</th><th>Qty</th><th>Price</th><th>In catalog</th></tr>{items}</table>\
             <p>Total: {:.2} &middot; Status: {:?} &middot; Payment: {:?}</p>\
             <form method=\"post\" action=\"/orders/{}/status\">\
             <select name=\"status\">{options}</select>\
             <button type=\"submit\">Update status</button></form>",
            admin_nav(),
            esc(&order.order.order_number),
            order.order.total_amount,
            order.order.status,
            order.order.payment_status,
            order.order.id,
        ),
    )
}
