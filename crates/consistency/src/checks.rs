//! The twelve TPC-C consistency conditions (clause 3.3.2).
//!
//! Each check is a value object carrying one aggregate query and the
//! predicate classifying its result. Conditions 1-3 compute a per-district
//! difference that must be exactly zero; conditions 4-12 count violating
//! rows directly, so any nonzero count is a failure. All arithmetic on
//! returned values is exact decimal, never binary floating point.

use crate::error::CheckError;
use crate::executor::QueryExecutor;
use rust_decimal::Decimal;

/// Number of consistency conditions in the battery.
pub const CHECK_COUNT: usize = 12;

/// How a check's query result maps to pass/fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Every returned row holds a computed difference that must equal
    /// exactly zero.
    ZeroDiff,
    /// The query counts violating rows; every returned count must be zero.
    ZeroRows,
}

/// One consistency condition: a numbered query template plus predicate.
///
/// `binds` is how many times the warehouse id is bound into the query;
/// correlated subqueries repeat it.
#[derive(Debug)]
pub struct InvariantCheck {
    pub number: u8,
    pub name: &'static str,
    pub expect: Expect,
    pub sql: &'static str,
    pub binds: usize,
}

impl InvariantCheck {
    /// Run the check against one warehouse.
    ///
    /// Zero returned rows is a trivial pass: a warehouse with no districts
    /// in scope (or a district with no outstanding new orders, which
    /// clause 3.3.2.2 exempts) has nothing to violate.
    pub async fn evaluate(
        &self,
        executor: &dyn QueryExecutor,
        warehouse: u32,
    ) -> Result<(), CheckError> {
        let params = vec![warehouse; self.binds];
        let rows = executor.query(self.sql, &params).await?;

        for row in &rows {
            let cell = row
                .first()
                .ok_or_else(|| CheckError::scan(self.sql, "result row has no columns"))?;
            let observed = cell.to_decimal().ok_or_else(|| {
                CheckError::scan(self.sql, format!("cannot decode {cell:?} as a number"))
            })?;
            if observed != Decimal::ZERO {
                return Err(CheckError::Violation {
                    check: self.number,
                    name: self.name,
                    warehouse,
                    observed,
                });
            }
        }

        Ok(())
    }
}

/// The fixed, ordered battery, numbered 1-12 to match the published
/// clause numbering. Order only determines which failure is reported
/// first when a warehouse has multiple violations.
pub fn all_checks() -> &'static [InvariantCheck; CHECK_COUNT] {
    &CHECKS
}

static CHECKS: [InvariantCheck; CHECK_COUNT] = [
    // W_YTD = sum(D_YTD) for each warehouse
    InvariantCheck {
        number: 1,
        name: "warehouse-ytd",
        expect: Expect::ZeroDiff,
        sql: "SELECT SUM(d_ytd) - MAX(w_ytd) \
              FROM district, warehouse \
              WHERE d_w_id = w_id AND w_id = ? \
              GROUP BY d_w_id",
        binds: 1,
    },
    // D_NEXT_O_ID - 1 = max(O_ID) = max(NO_O_ID) for each district.
    // ABS instead of the classic POWER pair keeps the engine-side
    // arithmetic in exact integers.
    InvariantCheck {
        number: 2,
        name: "district-next-order-id",
        expect: Expect::ZeroDiff,
        sql: "SELECT ABS(d_next_o_id - 1 - mo) + ABS(d_next_o_id - 1 - mno) \
              FROM district dis, \
                   (SELECT o_d_id, MAX(o_id) mo FROM orders \
                    WHERE o_w_id = ? GROUP BY o_d_id) o, \
                   (SELECT no_d_id, MAX(no_o_id) mno FROM new_order \
                    WHERE no_w_id = ? GROUP BY no_d_id) no \
              WHERE d_w_id = ? AND o.o_d_id = dis.d_id AND no.no_d_id = dis.d_id",
        binds: 3,
    },
    // Outstanding new-order ids are dense per district
    InvariantCheck {
        number: 3,
        name: "new-order-id-density",
        expect: Expect::ZeroDiff,
        sql: "SELECT MAX(no_o_id) - MIN(no_o_id) + 1 - COUNT(*) \
              FROM new_order WHERE no_w_id = ? \
              GROUP BY no_d_id",
        binds: 1,
    },
    // sum(O_OL_CNT) = number of order_line rows for each district
    InvariantCheck {
        number: 4,
        name: "district-order-line-count",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM (SELECT o_d_id, SUM(o_ol_cnt) sm, MAX(cn) cn \
                    FROM orders, \
                         (SELECT ol_d_id, COUNT(*) cn FROM order_line \
                          WHERE ol_w_id = ? GROUP BY ol_d_id) ol \
                    WHERE o_w_id = ? AND ol_d_id = o_d_id \
                    GROUP BY o_d_id) t \
              WHERE sm <> cn",
        binds: 2,
    },
    // An order is delivered (carrier set) or outstanding (new_order row
    // present), never both, never neither
    InvariantCheck {
        number: 5,
        name: "order-delivery-flag",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM orders LEFT JOIN new_order \
                   ON (no_w_id = o_w_id AND no_d_id = o_d_id AND no_o_id = o_id) \
              WHERE o_w_id = ? \
                AND ((o_carrier_id IS NULL AND no_o_id IS NULL) \
                     OR (o_carrier_id IS NOT NULL AND no_o_id IS NOT NULL))",
        binds: 1,
    },
    // O_OL_CNT = number of order_line rows for each order
    InvariantCheck {
        number: 6,
        name: "order-line-count",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM (SELECT o_ol_cnt, cn \
                    FROM orders \
                         JOIN (SELECT ol_w_id, ol_d_id, ol_o_id, COUNT(*) cn \
                               FROM order_line \
                               GROUP BY ol_w_id, ol_d_id, ol_o_id) ol \
                           ON o_w_id = ol_w_id AND o_d_id = ol_d_id AND o_id = ol_o_id \
                    WHERE o_w_id = ?) t \
              WHERE o_ol_cnt <> cn",
        binds: 1,
    },
    // OL_DELIVERY_D is set iff the parent order's O_CARRIER_ID is set
    InvariantCheck {
        number: 7,
        name: "order-line-delivery-date",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM orders, order_line \
              WHERE o_w_id = ol_w_id AND o_d_id = ol_d_id AND o_id = ol_o_id \
                AND o_w_id = ? \
                AND ((ol_delivery_d IS NULL AND o_carrier_id IS NOT NULL) \
                     OR (ol_delivery_d IS NOT NULL AND o_carrier_id IS NULL))",
        binds: 1,
    },
    // W_YTD = sum(H_AMOUNT) for each warehouse
    InvariantCheck {
        number: 8,
        name: "warehouse-history-amount",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM (SELECT w_ytd, SUM(h_amount) sm \
                    FROM warehouse, history \
                    WHERE h_w_id = w_id AND w_id = ? \
                    GROUP BY w_id) t \
              WHERE w_ytd <> sm",
        binds: 1,
    },
    // D_YTD = sum(H_AMOUNT) for each district
    InvariantCheck {
        number: 9,
        name: "district-history-amount",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM (SELECT d_id, d_w_id, SUM(d_ytd) s1 FROM district \
                    GROUP BY d_id, d_w_id) d, \
                   (SELECT h_d_id, h_w_id, SUM(h_amount) s2 FROM history \
                    WHERE h_w_id = ? GROUP BY h_d_id, h_w_id) h \
              WHERE d_id = h_d_id AND d_w_id = h_w_id AND d_w_id = ? AND s1 <> s2",
        binds: 2,
    },
    // C_BALANCE = sum of delivered order-line amounts minus payment history
    InvariantCheck {
        number: 10,
        name: "customer-balance",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM (SELECT c.c_balance bal, \
                           (SELECT SUM(ol_amount) \
                            FROM orders STRAIGHT_JOIN order_line \
                            WHERE ol_w_id = o_w_id AND ol_d_id = o_d_id AND ol_o_id = o_id \
                              AND ol_delivery_d IS NOT NULL \
                              AND o_w_id = c.c_w_id AND o_d_id = c.c_d_id AND o_c_id = c.c_id) sm, \
                           (SELECT SUM(h_amount) \
                            FROM history \
                            WHERE h_c_w_id = c.c_w_id AND h_c_d_id = c.c_d_id AND h_c_id = c.c_id) smh \
                    FROM customer c \
                    WHERE c.c_w_id = ?) t \
              WHERE bal <> sm - smh",
        binds: 1,
    },
    // count(orders) - 2100 = count(new_order) for each district carrying
    // the initial per-district order backlog
    InvariantCheck {
        number: 11,
        name: "district-order-backlog",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM (SELECT o_w_id, o_d_id, COUNT(*) oc FROM orders \
                    GROUP BY o_w_id, o_d_id) o \
                   JOIN (SELECT no_w_id, no_d_id, COUNT(*) noc FROM new_order \
                         GROUP BY no_w_id, no_d_id) no \
                     ON o_w_id = no_w_id AND o_d_id = no_d_id \
                   JOIN (SELECT c_w_id, c_d_id, COUNT(*) cc FROM customer \
                         GROUP BY c_w_id, c_d_id) c \
                     ON no_w_id = c_w_id AND no_d_id = c_d_id \
              WHERE c_w_id = ? AND oc - 2100 <> noc",
        binds: 1,
    },
    // C_BALANCE + C_YTD_PAYMENT = sum of delivered order-line amounts
    InvariantCheck {
        number: 12,
        name: "customer-balance-ytd",
        expect: Expect::ZeroRows,
        sql: "SELECT COUNT(*) \
              FROM (SELECT c.c_balance bal, c.c_ytd_payment ytd, \
                           (SELECT SUM(ol_amount) \
                            FROM orders STRAIGHT_JOIN order_line \
                            WHERE ol_w_id = o_w_id AND ol_d_id = o_d_id AND ol_o_id = o_id \
                              AND ol_delivery_d IS NOT NULL \
                              AND o_w_id = c.c_w_id AND o_d_id = c.c_d_id AND o_c_id = c.c_id) sm \
                    FROM customer c \
                    WHERE c.c_w_id = ?) t \
              WHERE bal + ytd <> sm",
        binds: 1,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_numbered_in_order() {
        let checks = all_checks();
        assert_eq!(checks.len(), CHECK_COUNT);
        for (i, check) in checks.iter().enumerate() {
            assert_eq!(check.number as usize, i + 1);
        }
    }

    #[test]
    fn test_bind_count_matches_placeholders() {
        for check in all_checks() {
            let placeholders = check.sql.matches('?').count();
            assert_eq!(
                placeholders, check.binds,
                "check {} binds {} ids but its query has {} placeholders",
                check.number, check.binds, placeholders
            );
        }
    }

    #[test]
    fn test_predicate_kinds() {
        for check in all_checks() {
            let expected = if check.number <= 3 {
                Expect::ZeroDiff
            } else {
                Expect::ZeroRows
            };
            assert_eq!(check.expect, expected, "check {}", check.number);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = all_checks().iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CHECK_COUNT);
    }
}
