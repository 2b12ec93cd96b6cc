use serde_json::json;
use sqlx_sqlite_query::{
   Filter, PaginationMode, PaginationParams, PaginationRequest, QueryBuilder, Scalar,
   SelectQuery, SortDirection, encode_cursor,
};

/// Render the query a listing endpoint would run for `request`.
fn render(base: &SelectQuery, request: PaginationRequest) -> (String, Vec<Scalar>) {
   QueryBuilder::new(base)
      .with_request(request)
      .allow_filters(["status", "category", "price", "name"])
      .allow_sorts(["name", "price", "created_at"])
      .search_columns(["name", "sku"])
      .build()
      .to_sql()
      .unwrap()
}

// ─── JSON Bodies ───

#[test]
fn json_body_with_every_stage() {
   let request: PaginationRequest = serde_json::from_value(json!({
      "page": 3,
      "pageSize": 25,
      "search": "usb",
      "filters": [
         { "field": "status", "operator": "in", "values": ["active", "draft"] },
         { "field": "price", "operator": "between", "values": [10, 50] },
         { "field": "internal_cost", "operator": "gt", "value": 0 }
      ],
      "sort": [{ "field": "price", "direction": "DESC" }, { "field": "name" }]
   }))
   .unwrap();

   let (sql, binds) = render(&SelectQuery::table("products"), request);

   assert_eq!(
      sql,
      concat!(
         r#"SELECT * FROM "products" WHERE "status" IN ($1, $2) AND "price" BETWEEN $3 AND $4"#,
         r#" AND (LOWER("name") LIKE $5 OR LOWER("sku") LIKE $6)"#,
         r#" ORDER BY "price" DESC, "name" ASC LIMIT 25 OFFSET 50"#
      )
   );
   assert_eq!(
      binds,
      vec![
         Scalar::from("active"),
         Scalar::from("draft"),
         Scalar::from(10),
         Scalar::from(50),
         Scalar::from("%usb%"),
         Scalar::from("%usb%"),
      ]
   );
}

#[test]
fn in_filter_accepts_a_list_value() {
   let filter: Filter = serde_json::from_value(json!({
      "field": "category",
      "operator": "in",
      "value": ["a", "b", "c"]
   }))
   .unwrap();

   let (sql, binds) = render(
      &SelectQuery::table("products"),
      PaginationRequest::new().with_filter(filter),
   );

   assert!(sql.contains(r#""category" IN ($1, $2, $3)"#));
   assert_eq!(binds.len(), 3);
}

#[test]
fn malformed_filters_from_json_fail_validation_but_not_the_build() {
   let filter: Filter = serde_json::from_value(json!({
      "field": "price",
      "operator": "between",
      "values": [1]
   }))
   .unwrap();

   assert_eq!(filter.validate().unwrap_err().error_code(), "INVALID_FILTER");

   let (sql, binds) = render(
      &SelectQuery::table("products"),
      PaginationRequest::new().with_filter(filter),
   );

   assert!(!sql.contains("WHERE"));
   assert!(binds.is_empty());
}

// ─── Query Strings ───

#[test]
fn query_string_cursor_request() {
   let params: PaginationParams = serde_json::from_value(json!({
      "cursor": encode_cursor(40),
      "pageSize": "10",
      "sort": "name:desc"
   }))
   .unwrap();

   let request = PaginationRequest::from_params(params);
   assert_eq!(request.mode, PaginationMode::Cursor);

   let (sql, binds) = render(&SelectQuery::table("products"), request);

   assert_eq!(
      sql,
      r#"SELECT * FROM "products" WHERE "id" > $1 ORDER BY "name" DESC LIMIT 10"#
   );
   assert_eq!(binds, vec![Scalar::Int(40)]);
}

#[test]
fn query_string_garbage_degrades_to_the_first_page() {
   let request = PaginationRequest::from_pairs([
      ("page", "-4"),
      ("page_size", "0"),
      ("sort", "password:desc,,"),
      ("mode", "sideways"),
   ]);

   let (sql, binds) = render(&SelectQuery::table("products"), request);

   // Unknown sort dropped; the configured default does not come back
   assert_eq!(sql, r#"SELECT * FROM "products" LIMIT 20"#);
   assert!(binds.is_empty());
}

// ─── Base Queries ───

#[test]
fn joined_base_query() {
   let base = SelectQuery::table("products")
      .join(r#"JOIN "categories" ON "categories"."id" = "products"."category_id""#);

   let query = QueryBuilder::new(&base)
      .with_request(
         PaginationRequest::for_page(1, 5).with_filter(Filter::eq("categories.slug", "audio")),
      )
      .default_sort("products.name", SortDirection::Asc)
      .build();

   let (sql, _) = query.to_sql().unwrap();

   assert_eq!(
      sql,
      concat!(
         r#"SELECT "products".* FROM "products" JOIN "categories" ON "categories"."id" = "products"."category_id""#,
         r#" WHERE "categories"."slug" = $1 ORDER BY "products"."name" ASC LIMIT 5"#
      )
   );
}

#[test]
fn raw_base_query_shares_the_placeholder_sequence() {
   let base = SelectQuery::from_sql(
      "SELECT * FROM products WHERE tenant_id = $1 AND (SELECT COUNT(*) FROM reviews LIMIT 1) >= 0;",
      vec![Scalar::from(7)],
   );

   let (sql, binds) = render(
      &base,
      PaginationRequest::for_page(2, 10).with_filter(Filter::eq("status", "active")),
   );

   assert_eq!(
      sql,
      concat!(
         r#"SELECT * FROM (SELECT * FROM products WHERE tenant_id = $1 AND (SELECT COUNT(*) FROM reviews LIMIT 1) >= 0)"#,
         r#" AS "base" WHERE "status" = $2 ORDER BY "created_at" DESC LIMIT 10 OFFSET 10"#
      )
   );
   assert_eq!(binds, vec![Scalar::from(7), Scalar::from("active")]);
}
