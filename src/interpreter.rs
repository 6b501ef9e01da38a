use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::callable::{Callable, NativeFunction};
use crate::class::{Class, Instance, CONSTRUCTOR};
use crate::environment::{self, EnvRef, Environment};
use crate::error::{LoxError, Result, RuntimeError};
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::function::Function;
use crate::output::Output;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::{Token, TokenType};
use crate::value::{format_number, Value};

/// Why evaluation stopped early.  `Return` is not an error: it unwinds to the
/// nearest function call, which turns it back into a value.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("Return signal with value: {value}")]
    Return { keyword: Token, value: Value },
}

/// Convenient alias for interpreter results.
pub type IResult<T> = std::result::Result<T, InterpretError>;

/// Tree-walking evaluator.
pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    output: Output,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter printing to stdout, with `clock` defined.
    pub fn new() -> Self {
        Self::with_output(Output::Stdout)
    }

    pub fn with_output(output: Output) -> Self {
        info!("Initializing Interpreter");

        let globals = Environment::new().into_ref();

        debug!("Defining native function 'clock'");
        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(NativeFunction::clock())),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// The root scope.  Persists across `interpret` calls.
    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Record the resolver's verdict: the variable at `id` lives `depth`
    /// scopes up from where it is used.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("Noting local {} at depth {}", id, depth);
        self.locals.insert(id, depth);
    }

    /// Run a program.  The first runtime error stops execution and is
    /// returned for the driver to report.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(InterpretError::Runtime(e)) => {
                    debug!("Runtime error: {}", e);
                    return Err(LoxError::Runtime(e));
                }
                Err(InterpretError::Return { keyword, .. }) => {
                    // The resolver rejects top-level returns; this only fires
                    // when a program skipped that pass.
                    return Err(LoxError::Runtime(RuntimeError::type_error(
                        &keyword,
                        "Can't return from top-level code.",
                    )));
                }
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ───────────────────────────── statements ─────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> IResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.output.println(&value.to_string());
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let env = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, env.into_ref())?;
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = Function::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
            }

            Stmt::Return { keyword, value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                return Err(InterpretError::Return {
                    keyword: keyword.clone(),
                    value,
                });
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods)?,
        }

        Ok(())
    }

    /// Run `statements` with `environment` as the current scope.  The previous
    /// scope comes back no matter how the block exits.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<()> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;
        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> IResult<()> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass: Option<Rc<Class>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Callable(Callable::Class(class)) => Some(class),
                _ => {
                    let token = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(RuntimeError::type_error(token, "Superclass must be a class.").into());
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        let enclosing = superclass.as_ref().map(|superclass| {
            let mut env = Environment::with_enclosing(Rc::clone(&self.environment));
            env.define("super", Value::Callable(Callable::Class(Rc::clone(superclass))));
            std::mem::replace(&mut self.environment, env.into_ref())
        });

        let methods = methods
            .iter()
            .map(|method| {
                let function = Function::new(
                    Rc::clone(method),
                    Rc::clone(&self.environment),
                    method.name.lexeme == CONSTRUCTOR,
                );
                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect::<HashMap<_, _>>();

        if let Some(enclosing) = enclosing {
            self.environment = enclosing;
        }

        let class = Class::new(name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(name, Value::Callable(Callable::Class(Rc::new(class))))?;

        info!("Class '{}' defined", name.lexeme);
        Ok(())
    }

    // ──────────────────────────── expressions ─────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        let value = match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::string(s),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            },

            Expr::Grouping(inner) => self.evaluate(inner)?,

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right)?,

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right)?,

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuit {
                    left
                } else {
                    self.evaluate(right)?
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name)?,

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        if !environment::assign_at(
                            &self.environment,
                            distance,
                            &name.lexeme,
                            value.clone(),
                        ) {
                            return Err(RuntimeError::undefined_variable(name).into());
                        }
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                value
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let arguments = arguments
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<IResult<Vec<Value>>>()?;

                let Value::Callable(callable) = callee else {
                    return Err(RuntimeError::type_error(
                        paren,
                        "Can only call functions and classes.",
                    )
                    .into());
                };

                if arguments.len() != callable.arity() {
                    return Err(RuntimeError::arity_mismatch(
                        paren,
                        callable.arity(),
                        arguments.len(),
                    )
                    .into());
                }

                callable.call(self, arguments)?
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Instance::get(&instance, name)?,
                _ => {
                    return Err(
                        RuntimeError::type_error(name, "Only instances have properties.").into(),
                    )
                }
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::type_error(name, "Only instances have fields.").into());
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());
                value
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword)?,

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method)?,
        };

        debug!("Expression evaluated to: {}", value);
        Ok(value)
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> IResult<Value> {
        let value = match self.locals.get(&id) {
            Some(&distance) => environment::get_at(&self.environment, distance, &name.lexeme)
                .ok_or_else(|| RuntimeError::undefined_variable(name))?,
            None => self.globals.borrow().get(name)?,
        };

        Ok(value)
    }

    /// `super.method`: the class comes from the `super` binding, the receiver
    /// from the `this` binding one scope further in.
    fn evaluate_super(&self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let distance = *self
            .locals
            .get(&id)
            .ok_or_else(|| RuntimeError::undefined_variable(keyword))?;

        let superclass = match environment::get_at(&self.environment, distance, "super") {
            Some(Value::Callable(Callable::Class(class))) => class,
            other => panic!(
                "'super' at depth {} must hold a class, found {:?}",
                distance, other
            ),
        };

        let receiver = distance
            .checked_sub(1)
            .and_then(|depth| environment::get_at(&self.environment, depth, "this"));

        let instance = match receiver {
            Some(Value::Instance(instance)) => instance,
            other => panic!(
                "'this' must be bound one scope inside 'super' (depth {}), found {:?}",
                distance, other
            ),
        };

        let method = superclass
            .find_method(&method.lexeme)
            .ok_or_else(|| RuntimeError::undefined_property(method))?;

        Ok(Value::Callable(Callable::Function(Rc::new(
            method.bind(instance),
        ))))
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> IResult<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::type_error(operator, "Operand must be a number.").into()),
            },
            _ => unreachable!("parser only builds '!' and '-' unary nodes"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> IResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        debug!("Binary '{}' on {} and {}", operator.lexeme, left, right);

        let value = match operator.token_type {
            TokenType::PLUS => add(operator, left, right)?,

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Number(a - b)
            }
            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Number(a * b)
            }
            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left, &right)?;
                if b == 0.0 {
                    return Err(RuntimeError::division_by_zero(operator).into());
                }
                Value::Number(a / b)
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a > b)
            }
            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a >= b)
            }
            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a < b)
            }
            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Value::Bool(a <= b)
            }

            TokenType::EQUAL_EQUAL => Value::Bool(left == right),
            TokenType::BANG_EQUAL => Value::Bool(left != right),

            _ => unreachable!("parser only builds binary nodes for binary operators"),
        };

        Ok(value)
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> IResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::type_error(operator, "Operands must be numbers.").into()),
    }
}

/// `+` adds numbers, concatenates strings, and renders a number operand in
/// its display form when the other side is a string.
fn add(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    let value = match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        (Value::String(a), Value::String(b)) => Value::string(format!("{a}{b}")),
        (Value::Number(a), Value::String(b)) => Value::string(format!("{}{b}", format_number(a))),
        (Value::String(a), Value::Number(b)) => Value::string(format!("{a}{}", format_number(b))),
        _ => {
            return Err(RuntimeError::type_error(
                operator,
                "Operands must be two numbers or two strings.",
            )
            .into())
        }
    };

    Ok(value)
}
