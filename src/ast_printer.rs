use crate::expr::{Expr, LiteralValue};

/// Renders expressions in parenthesised prefix form, e.g. `(* (- 1.0) 2.0)`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                // 3 → "3.0", 3.14 → "3.14"
                LiteralValue::Number(n) => format!("{:?}", n),
                LiteralValue::Str(s) => s.clone(),
                LiteralValue::True => "true".to_string(),
                LiteralValue::False => "false".to_string(),
                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(inner) => self.parenthesize("group", &[&**inner]),

            Expr::Unary { operator, right } => self.parenthesize(&operator.lexeme, &[&**right]),

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[&**left, &**right]),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                self.parenthesize(&format!("= {}", name.lexeme), &[&**value])
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut parts = vec![self.print(callee)];
                parts.extend(arguments.iter().map(|arg| self.print(arg)));
                format!("(call {})", parts.join(" "))
            }

            Expr::Get { object, name } => {
                self.parenthesize(&format!(". {}", name.lexeme), &[&**object])
            }

            Expr::Set {
                object,
                name,
                value,
            } => self.parenthesize(&format!("= . {}", name.lexeme), &[&**object, &**value]),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    fn parenthesize(&self, name: &str, exprs: &[&Expr]) -> String {
        let mut out = format!("({}", name);

        for expr in exprs {
            out.push(' ');
            out.push_str(&self.print(expr));
        }

        out.push(')');
        out
    }
}
