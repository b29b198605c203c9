use logsift::{
    canonicalize_sql, extract_field_name, extract_field_names, extract_fields, extract_table_name,
    extract_where_condition, sql_key_string, SqlKey,
};

/// Two selects that only differ in literals share a key; WHERE columns come back sorted.
#[test]
fn literals_do_not_change_the_key() {
    let a = canonicalize_sql("select id,name from users where status = 1 and age > 18");
    let b = canonicalize_sql("select id,name from users where status = 2 and age > 30");
    assert_eq!(
        a,
        SqlKey { table: "users".into(), fields: "id,name".into(), where_fields: "age,status".into() }
    );
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "users|id,name|age,status");
}

/// Table, projection and WHERE columns each separate shapes.
#[test]
fn shape_differences_split_keys() {
    let base = sql_key_string("select id from users where status = 1");
    assert_ne!(base, sql_key_string("select id from orders where status = 1"));
    assert_ne!(base, sql_key_string("select id,name from users where status = 1"));
    assert_ne!(base, sql_key_string("select id from users where kind = 1"));
    assert_ne!(base, sql_key_string("select id from users"));
}

/// Keywords and identifiers are case-insensitive.
#[test]
fn case_is_ignored() {
    assert_eq!(
        sql_key_string("SELECT ID FROM Users WHERE Status = 1"),
        sql_key_string("select id from users where status = 7"),
    );
}

/// `distinct` is dropped from the projection.
#[test]
fn distinct_is_stripped() {
    assert_eq!(extract_fields("select distinct id from users"), "id");
    assert_eq!(sql_key_string("select distinct id from users"), sql_key_string("select id from users"));
}

#[test]
fn table_and_fields_need_a_select() {
    assert_eq!(extract_table_name("select * from t_order where id = 1"), "t_order");
    assert_eq!(extract_table_name("select * from t_order"), "t_order");
    assert_eq!(extract_table_name("update t_order set a = 1"), "");
    assert_eq!(extract_fields("delete from t_order where id = 1"), "");
}

/// ORDER BY, GROUP BY and LIMIT end the WHERE clause.
#[test]
fn where_clause_terminators() {
    assert_eq!(extract_where_condition("select id from t where a = 1 order by b desc"), "a");
    assert_eq!(extract_where_condition("select id from t where a = 1 group by c"), "a");
    assert_eq!(extract_where_condition("select * from t where a = 1 and b = 2 limit 10"), "a,b");
    assert_eq!(extract_where_condition("select id from t"), "");
}

/// Alias prefixes are stripped and literals (numbers, lists) are skipped.
#[test]
fn aliases_and_literals() {
    let key = canonicalize_sql("select u.id from users u where u.status = 1 and u.age > 3");
    assert_eq!(key.table, "users");
    assert_eq!(key.fields, "u.id");
    assert_eq!(key.where_fields, "age,status");

    assert_eq!(extract_where_condition("select id from t where uid in (1,2,3)"), "uid");
    assert_eq!(extract_field_names("a = 1 or b >= 2 or a <= 3"), "a,b");
}

#[test]
fn single_condition_tokens() {
    assert_eq!(extract_field_name("t.col"), Some("col".to_string()));
    assert_eq!(extract_field_name("(status)"), Some("status".to_string()));
    assert_eq!(extract_field_name("123"), None);
    assert_eq!(extract_field_name("col1"), None);
    assert_eq!(extract_field_name("`col`"), None);
    assert_eq!(extract_field_name("{x}"), None);
    assert_eq!(extract_field_name(""), None);
}

/// Non-select statements have empty table and fields, so they collide on WHERE shape alone.
#[test]
fn non_select_statements_collide_on_where_shape() {
    let update = canonicalize_sql("update users set a = 1 where id = 5");
    let delete = canonicalize_sql("delete from orders where id = 9");
    assert_eq!(update.table, "");
    assert_eq!(update, delete);
    assert_eq!(update.to_string(), "||id");
}
